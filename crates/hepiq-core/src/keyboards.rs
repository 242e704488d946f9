use crate::{
    callback::{AdminCommand, CallbackAction},
    domain::{Department, Stage, StudyType, TicketId},
    messaging::types::{InlineButton, InlineKeyboard},
    texts,
};

fn button(label: impl Into<String>, action: CallbackAction) -> InlineButton {
    InlineButton::new(label, action.encode())
}

pub fn main_menu() -> InlineKeyboard {
    InlineKeyboard::one_per_row([
        button(texts::MENU_NEW_TICKET, CallbackAction::NewTicket),
        button(texts::MENU_FAQ, CallbackAction::Faq),
    ])
}

pub fn departments() -> InlineKeyboard {
    InlineKeyboard::one_per_row(
        Department::ALL.map(|d| button(d.label(), CallbackAction::Department(d))),
    )
}

pub fn stages() -> InlineKeyboard {
    InlineKeyboard::one_per_row(
        Stage::all().map(|s| button(texts::stage_label(s.get()), CallbackAction::Stage(s))),
    )
}

pub fn study_types() -> InlineKeyboard {
    InlineKeyboard::one_per_row(
        StudyType::ALL.map(|s| button(s.label(), CallbackAction::StudyType(s))),
    )
}

pub fn photo_choice() -> InlineKeyboard {
    InlineKeyboard::one_per_row([
        button(texts::PHOTO_ATTACH, CallbackAction::AttachPhoto),
        button(texts::PHOTO_SKIP, CallbackAction::SkipPhoto),
    ])
}

/// Accept / ask-more on the first row, resolve on the second.
pub fn admin_ticket_actions(id: TicketId) -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![
            button(
                texts::ADMIN_ASSIGN,
                CallbackAction::Admin(AdminCommand::Assign, id),
            ),
            button(
                texts::ADMIN_ASK_MORE,
                CallbackAction::Admin(AdminCommand::AskMore, id),
            ),
        ],
        vec![button(
            texts::ADMIN_RESOLVE,
            CallbackAction::Admin(AdminCommand::Resolve, id),
        )],
    ])
}
