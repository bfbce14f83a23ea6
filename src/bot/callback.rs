// Inline button payloads.

const MENU_BACK: &str = "menu_back";
const MENU_PLAY: &str = "menu_play";
const MENU_AI_PLAY: &str = "menu_ai_play";
const MENU_PHOTO: &str = "menu_photo";
const MENU_SHOW_ALL: &str = "menu_show_all";
const MENU_FIND_MEMBER: &str = "menu_find_member";
const MENU_LEARN: &str = "menu_learn";
const MENU_CATALOG: &str = "menu_catalog";
const MENU_UPLOAD: &str = "menu_upload";
const CATALOG_BY_GROUP: &str = "catalog_by_group";
const CATALOG_RANDOM: &str = "catalog_random";
const CATALOG_NEXT: &str = "catalog_next";
const CATALOG_PICK: &str = "catalog_group:";
const UPLOAD_GROUP: &str = "upload_group:";
const UPLOAD_MEMBER: &str = "upload_member:";
const UPLOAD_MORE: &str = "upload_more";
const LEARN_PICK: &str = "learn_pick:";
const LEARN_TRAIN: &str = "learn_train:";
const LEARN_EXIT: &str = "learn_exit";

/// Every action a button can trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    MenuBack,
    Play,
    AiPlay,
    PhotoQuiz,
    ShowAll,
    FindMember,
    LearnMenu,
    LearnPick(String),
    LearnTrain(String),
    LearnExit,
    CatalogMenu,
    CatalogByGroup,
    CatalogPick(String),
    CatalogRandom,
    CatalogNext,
    UploadMenu,
    UploadGroup(String),
    UploadMember(String),
    UploadMore,
}

impl Callback {
    /// Decode button data. Unknown payloads yield `None`.
    pub fn parse(data: &str) -> Option<Self> {
        let simple = match data {
            MENU_BACK => Some(Callback::MenuBack),
            MENU_PLAY => Some(Callback::Play),
            MENU_AI_PLAY => Some(Callback::AiPlay),
            MENU_PHOTO => Some(Callback::PhotoQuiz),
            MENU_SHOW_ALL => Some(Callback::ShowAll),
            MENU_FIND_MEMBER => Some(Callback::FindMember),
            MENU_LEARN => Some(Callback::LearnMenu),
            MENU_CATALOG => Some(Callback::CatalogMenu),
            MENU_UPLOAD => Some(Callback::UploadMenu),
            CATALOG_BY_GROUP => Some(Callback::CatalogByGroup),
            CATALOG_RANDOM => Some(Callback::CatalogRandom),
            CATALOG_NEXT => Some(Callback::CatalogNext),
            UPLOAD_MORE => Some(Callback::UploadMore),
            LEARN_EXIT => Some(Callback::LearnExit),
            _ => None,
        };
        if simple.is_some() {
            return simple;
        }

        let prefixed: [(&str, fn(String) -> Callback); 5] = [
            (CATALOG_PICK, Callback::CatalogPick),
            (UPLOAD_GROUP, Callback::UploadGroup),
            (UPLOAD_MEMBER, Callback::UploadMember),
            (LEARN_PICK, Callback::LearnPick),
            (LEARN_TRAIN, Callback::LearnTrain),
        ];
        prefixed.iter().find_map(|(prefix, build)| {
            data.strip_prefix(prefix)
                .filter(|arg| !arg.is_empty())
                .map(|arg| build(arg.to_string()))
        })
    }

    /// Encode as button data.
    pub fn data(&self) -> String {
        match self {
            Callback::MenuBack => MENU_BACK.to_string(),
            Callback::Play => MENU_PLAY.to_string(),
            Callback::AiPlay => MENU_AI_PLAY.to_string(),
            Callback::PhotoQuiz => MENU_PHOTO.to_string(),
            Callback::ShowAll => MENU_SHOW_ALL.to_string(),
            Callback::FindMember => MENU_FIND_MEMBER.to_string(),
            Callback::LearnMenu => MENU_LEARN.to_string(),
            Callback::LearnPick(key) => format!("{LEARN_PICK}{key}"),
            Callback::LearnTrain(key) => format!("{LEARN_TRAIN}{key}"),
            Callback::LearnExit => LEARN_EXIT.to_string(),
            Callback::CatalogMenu => MENU_CATALOG.to_string(),
            Callback::CatalogByGroup => CATALOG_BY_GROUP.to_string(),
            Callback::CatalogPick(key) => format!("{CATALOG_PICK}{key}"),
            Callback::CatalogRandom => CATALOG_RANDOM.to_string(),
            Callback::CatalogNext => CATALOG_NEXT.to_string(),
            Callback::UploadMenu => MENU_UPLOAD.to_string(),
            Callback::UploadGroup(key) => format!("{UPLOAD_GROUP}{key}"),
            Callback::UploadMember(member) => format!("{UPLOAD_MEMBER}{member}"),
            Callback::UploadMore => UPLOAD_MORE.to_string(),
        }
    }
}
