// Inline keyboards for every screen.

use super::callback::Callback;
use crate::catalog::{Group, GroupCatalog};
use crate::media::MediaStore;
use crate::telegram::{InlineKeyboardButton, InlineKeyboardMarkup};

fn button(text: &str, callback: Callback) -> InlineKeyboardButton {
    InlineKeyboardButton::new(text, callback.data())
}

fn rows(rows: Vec<Vec<InlineKeyboardButton>>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: rows,
    }
}

/// Lay buttons out two per row.
fn two_per_row(buttons: Vec<InlineKeyboardButton>) -> Vec<Vec<InlineKeyboardButton>> {
    buttons.chunks(2).map(<[InlineKeyboardButton]>::to_vec).collect()
}

pub fn menu() -> InlineKeyboardMarkup {
    let entries = [
        ("1. Guess the group (basic)", Callback::Play),
        ("2. Guess the group (AI)", Callback::AiPlay),
        ("3. Guess from the photo", Callback::PhotoQuiz),
        ("4. Show all groups", Callback::ShowAll),
        ("5. Find a member", Callback::FindMember),
        ("6. Learning mode", Callback::LearnMenu),
        ("7. Photo catalog", Callback::CatalogMenu),
        ("[admin] Add photos", Callback::UploadMenu),
    ];
    rows(
        entries
            .into_iter()
            .map(|(text, cb)| vec![button(text, cb)])
            .collect(),
    )
}

pub fn back() -> InlineKeyboardMarkup {
    rows(vec![vec![button("⬅️ Back to menu", Callback::MenuBack)]])
}

pub fn in_game() -> InlineKeyboardMarkup {
    rows(vec![vec![button("🏁 Stop the game", Callback::MenuBack)]])
}

pub fn upload_success() -> InlineKeyboardMarkup {
    rows(vec![
        vec![button("Add another photo", Callback::UploadMore)],
        vec![button("⬅️ Back to menu", Callback::MenuBack)],
    ])
}

pub fn learn_groups(groups: &[Group]) -> InlineKeyboardMarkup {
    let buttons = groups
        .iter()
        .map(|g| button(&g.display_name, Callback::LearnPick(g.key.clone())))
        .collect();
    let mut kb = two_per_row(buttons);
    kb.push(vec![button("⬅️ Back to menu", Callback::MenuBack)]);
    rows(kb)
}

pub fn learn_after_list(group_key: &str) -> InlineKeyboardMarkup {
    rows(vec![
        vec![button("▶️ Train this group", Callback::LearnTrain(group_key.to_string()))],
        vec![button("⬅️ Pick another group", Callback::LearnMenu)],
        vec![button("🏠 Main menu", Callback::MenuBack)],
    ])
}

pub fn learn_in_session() -> InlineKeyboardMarkup {
    rows(vec![
        vec![button("🏁 Finish training", Callback::LearnMenu)],
        vec![button("🏠 Main menu", Callback::MenuBack)],
    ])
}

pub fn learn_done() -> InlineKeyboardMarkup {
    rows(vec![
        vec![button("📚 Learn another group", Callback::LearnMenu)],
        vec![button("🏠 Main menu", Callback::MenuBack)],
    ])
}

pub fn catalog_menu() -> InlineKeyboardMarkup {
    rows(vec![
        vec![button("Browse by group", Callback::CatalogByGroup)],
        vec![button("Browse in random order", Callback::CatalogRandom)],
        vec![button("⬅️ Back to menu", Callback::MenuBack)],
    ])
}

pub fn catalog_nav() -> InlineKeyboardMarkup {
    rows(vec![
        vec![button("▶️ Next photo", Callback::CatalogNext)],
        vec![button("📁 Back to the catalog", Callback::CatalogMenu)],
        vec![button("🏠 Main menu", Callback::MenuBack)],
    ])
}

/// Groups with at least one stored photo.
pub fn catalog_groups(groups: &[Group], media: &dyn MediaStore) -> InlineKeyboardMarkup {
    let buttons = groups
        .iter()
        .filter(|g| g.members.iter().any(|m| media.has_images(m)))
        .map(|g| button(&g.display_name, Callback::CatalogPick(g.key.clone())))
        .collect();
    let mut kb = two_per_row(buttons);
    kb.push(vec![button("⬅️ Back to the catalog", Callback::CatalogMenu)]);
    rows(kb)
}

/// Library folders that accept uploads, titled by display name where known.
pub fn upload_groups(keys: &[String], catalog: &GroupCatalog) -> InlineKeyboardMarkup {
    let buttons = keys
        .iter()
        .map(|key| button(catalog.display_name(key), Callback::UploadGroup(key.clone())))
        .collect();
    let mut kb = two_per_row(buttons);
    kb.push(vec![button("⬅️ Back to menu", Callback::MenuBack)]);
    rows(kb)
}

pub fn upload_members(members: &[String]) -> InlineKeyboardMarkup {
    let buttons = members
        .iter()
        .map(|m| button(m, Callback::UploadMember(m.clone())))
        .collect();
    let mut kb = two_per_row(buttons);
    kb.push(vec![button("⬅️ Back to menu", Callback::MenuBack)]);
    rows(kb)
}
