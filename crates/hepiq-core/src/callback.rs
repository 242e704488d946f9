//! Callback payloads carried by inline buttons.
//!
//! Wire forms: `NEW_TICKET`, `FAQ`, `DEP::<code>`, `STAGE::<n>`,
//! `STUDY::<code>`, `PHOTO::YES`, `PHOTO::NO`, `ADM::<verb>::<ticket id>`.
//! Telegram caps callback data at 64 bytes, so departments and study types
//! travel as short ASCII codes.

use crate::domain::{Department, Stage, StudyType, TicketId};

pub const ADMIN_PREFIX: &str = "ADM::";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminCommand {
    Assign,
    AskMore,
    Resolve,
}

impl AdminCommand {
    fn verb(self) -> &'static str {
        match self {
            AdminCommand::Assign => "ASSIGN",
            AdminCommand::AskMore => "ASK",
            AdminCommand::Resolve => "RESOLVE",
        }
    }

    fn from_verb(v: &str) -> Option<Self> {
        match v {
            "ASSIGN" => Some(AdminCommand::Assign),
            "ASK" => Some(AdminCommand::AskMore),
            "RESOLVE" => Some(AdminCommand::Resolve),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    NewTicket,
    Faq,
    Department(Department),
    Stage(Stage),
    StudyType(StudyType),
    AttachPhoto,
    SkipPhoto,
    Admin(AdminCommand, TicketId),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "NEW_TICKET" => return Some(CallbackAction::NewTicket),
            "FAQ" => return Some(CallbackAction::Faq),
            "PHOTO::YES" => return Some(CallbackAction::AttachPhoto),
            "PHOTO::NO" => return Some(CallbackAction::SkipPhoto),
            _ => {}
        }

        let (prefix, rest) = data.split_once("::")?;
        match prefix {
            "DEP" => Department::from_code(rest).map(CallbackAction::Department),
            "STAGE" => rest
                .parse::<u8>()
                .ok()
                .and_then(Stage::new)
                .map(CallbackAction::Stage),
            "STUDY" => StudyType::from_code(rest).map(CallbackAction::StudyType),
            "ADM" => {
                let (verb, id) = rest.split_once("::")?;
                let cmd = AdminCommand::from_verb(verb)?;
                let id = id.parse::<i64>().ok()?;
                Some(CallbackAction::Admin(cmd, TicketId(id)))
            }
            _ => None,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            CallbackAction::NewTicket => "NEW_TICKET".to_string(),
            CallbackAction::Faq => "FAQ".to_string(),
            CallbackAction::Department(d) => format!("DEP::{}", d.code()),
            CallbackAction::Stage(s) => format!("STAGE::{}", s.get()),
            CallbackAction::StudyType(s) => format!("STUDY::{}", s.code()),
            CallbackAction::AttachPhoto => "PHOTO::YES".to_string(),
            CallbackAction::SkipPhoto => "PHOTO::NO".to_string(),
            CallbackAction::Admin(cmd, id) => format!("{ADMIN_PREFIX}{}::{}", cmd.verb(), id.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_admin_payloads() {
        assert_eq!(
            CallbackAction::parse("ADM::ASK::7"),
            Some(CallbackAction::Admin(AdminCommand::AskMore, TicketId(7)))
        );
        assert_eq!(
            CallbackAction::parse("ADM::RESOLVE::12"),
            Some(CallbackAction::Admin(AdminCommand::Resolve, TicketId(12)))
        );
        assert_eq!(CallbackAction::parse("ADM::ASK"), None);
        assert_eq!(CallbackAction::parse("ADM::CLOSE::7"), None);
        assert_eq!(CallbackAction::parse("ADM::ASSIGN::seven"), None);
    }

    #[test]
    fn rejects_out_of_range_choices() {
        assert_eq!(CallbackAction::parse("STAGE::0"), None);
        assert_eq!(CallbackAction::parse("STAGE::5"), None);
        assert_eq!(CallbackAction::parse("DEP::MATH"), None);
        assert_eq!(CallbackAction::parse("STUDY::NIGHT"), None);
        assert_eq!(CallbackAction::parse("askuser:1:0"), None);
        assert_eq!(CallbackAction::parse(""), None);
    }

    #[test]
    fn every_button_payload_fits_telegram_limit() {
        let mut all = vec![
            CallbackAction::NewTicket,
            CallbackAction::Faq,
            CallbackAction::AttachPhoto,
            CallbackAction::SkipPhoto,
            CallbackAction::Admin(AdminCommand::Resolve, TicketId(i64::MAX)),
        ];
        all.extend(Department::ALL.map(CallbackAction::Department));
        all.extend(Stage::all().map(CallbackAction::Stage));
        all.extend(StudyType::ALL.map(CallbackAction::StudyType));

        for action in all {
            let data = action.encode();
            assert!(data.len() <= 64, "{data} too long");
            assert_eq!(CallbackAction::parse(&data), Some(action));
        }
    }
}
