// User-facing message texts.

use crate::catalog::Group;
use crate::media::library::MAX_UPLOAD_BYTES;

pub const WELCOME: &str = "Welcome to the K-pop quiz! Pick an action:";
pub const MENU: &str = "Menu:";
pub const TEXT_ONLY: &str = "I only understand text messages. Pick an action:";

pub const AI_INTRO: &str = "⚔️ This is the advanced level! Take on the artificial intelligence.\n\
    You get 10 questions about K-pop groups from a popularity top list of boy and girl \
    groups prepared by AI.\nTry to score all 10 points!";
pub const AI_UNAVAILABLE: &str = "The AI group list is not available.\n\n\
    Generate top50_groups.json with the group generator and place it next to the bot.";
pub const DATA_UNAVAILABLE: &str = "Group data is not available.";
pub const PHOTOS_UNAVAILABLE: &str =
    "Photos are not available.\n\nThere are not enough images in the photo library.";
pub const PHOTO_INTRO: &str = "Guess from the photo! Name the idol in the picture.";
pub const WHO_IS_THIS: &str = "Who is this?";
pub const CORRECT: &str = "Correct!";
pub const WRONG: &str = "Wrong!";
pub const NEXT_QUESTION: &str = "Next question:";

pub const FIND_PROMPT: &str = "Enter the name of a K-pop group member:";
pub const MEMBER_NOT_FOUND: &str = "No such member found";

pub const LEARN_PICK: &str = "Choose a K-pop group to learn:";
pub const LEARN_CORRECT: &str = "Correct! ✅";
pub const ALREADY_KNOWN: &str = "Looks like you already know every member of this group!";
pub const GROUP_NOT_FOUND: &str = "Group not found.";

pub const CATALOG_MENU: &str = "Photo catalog:";
pub const CHOOSE_GROUP: &str = "Choose a group:";
pub const NO_GROUP_PHOTOS: &str = "No photos available for this group.";
pub const NO_PHOTOS: &str = "Photos are not available.";
pub const RANDOM_HEADER: &str = "Random idol photos:";
pub const NO_MORE_PHOTOS: &str = "No more photos.";

pub const UPLOAD_PASSWORD: &str = "Enter the password to upload photos:";
pub const UPLOADS_DISABLED: &str = "Photo uploads are disabled.";
pub const WRONG_PASSWORD: &str = "Wrong password. Try again:";
pub const NO_MEMBER_SELECTED: &str = "No member selected.";
pub const NO_UPLOAD_TARGET: &str = "No group or member selected.";
pub const DUPLICATE_PHOTO: &str = "This photo already exists.";
pub const UPLOADED: &str = "Photo uploaded!";
pub const SAVE_FAILED: &str = "Could not save the photo.";

pub fn question(member: &str) -> String {
    format!("Which group does {member} belong to?\n\nType the group name.")
}

pub fn next_question(feedback: &str, stats: &str, member: &str) -> String {
    format!("{feedback}\n{stats}\n\n{NEXT_QUESTION}\nWhich group does {member} belong to?")
}

pub fn wrong_photo(name: &str) -> String {
    format!("{WRONG} This is {name}")
}

pub fn progress(score: usize, total: usize, remaining: usize) -> String {
    format!("Correct answers: {score} of {total}. Questions left: {remaining}.")
}

pub fn finish(score: usize, total: usize) -> String {
    format!("Game over! You got {score} of {total}.")
}

pub fn all_groups(groups: &[Group]) -> String {
    let lines: Vec<String> = groups
        .iter()
        .map(|g| format!("*{}*: {}", g.display_name, g.members.join(", ")))
        .collect();
    format!("All groups:\n\n{}", lines.join("\n"))
}

pub fn member_found(member: &str, group: &str) -> String {
    format!("{member} is a member of *{group}*")
}

pub fn roster(group: &Group) -> String {
    format!(
        "Group lineup:\n\n{}: {}",
        group.display_name,
        group.members.join(", ")
    )
}

pub fn learn_prompt(group: &str, mask: &str) -> String {
    format!(
        "Group: {}\nGuess the member: <code>{}</code>\n\n(type the name as a message)",
        escape_html(group),
        escape_html(mask)
    )
}

pub fn learn_next(feedback: &str, group: &str, mask: &str) -> String {
    format!(
        "{}\n\nGroup: {}\nNext member: <code>{}</code>",
        escape_html(feedback),
        escape_html(group),
        escape_html(mask)
    )
}

pub fn learn_wrong(expected: &str) -> String {
    format!("Wrong. The answer is: {expected}")
}

pub fn learned_all(group: &str) -> String {
    format!("Congratulations! You named every member of {group} from memory! 🎉")
}

pub fn catalog_group_header(group: &str) -> String {
    format!("Photos of {group} members:")
}

pub fn catalog_random_caption(name: &str, group: &str) -> String {
    format!("{name} from {group}")
}

pub fn choose_member(group: &str) -> String {
    format!("Choose a member of {group}:")
}

pub fn send_photo_for(member: &str) -> String {
    format!(
        "Send a photo of {member} (up to {} MB)",
        MAX_UPLOAD_BYTES / (1024 * 1024)
    )
}

pub fn upload_limit(max: usize) -> String {
    format!("Daily upload limit of {max} photos reached.")
}

pub fn too_large() -> String {
    format!(
        "Photos may be up to {} MB.",
        MAX_UPLOAD_BYTES / (1024 * 1024)
    )
}

/// Escape text placed inside an HTML-formatted message.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
