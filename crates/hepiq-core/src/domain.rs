use std::fmt;

/// Telegram chat id (numeric). Students and administrators are both
/// addressed by their private chat with the bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Ticket primary key. Assigned by the store, strictly increasing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketId(pub i64);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Department {
    ComputerScience,
    InformationSystems,
    SmartMedicalSystems,
    CyberSecurity,
}

impl Department {
    pub const ALL: [Department; 4] = [
        Department::ComputerScience,
        Department::InformationSystems,
        Department::SmartMedicalSystems,
        Department::CyberSecurity,
    ];

    /// Display name; also the value persisted in the `tickets` table.
    pub fn label(self) -> &'static str {
        match self {
            Department::ComputerScience => "قسم علوم الحاسوب",
            Department::InformationSystems => "قسم نظم المعلومات",
            Department::SmartMedicalSystems => "قسم الأنظمة الطبية الذكية",
            Department::CyberSecurity => "قسم الأمن السيبراني",
        }
    }

    /// Short ASCII code used in callback payloads and env keys.
    pub fn code(self) -> &'static str {
        match self {
            Department::ComputerScience => "CS",
            Department::InformationSystems => "IS",
            Department::SmartMedicalSystems => "SMS",
            Department::CyberSecurity => "CYBER",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }
}

/// Academic stage (year of study), always 1..=4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Stage(u8);

impl Stage {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(n: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&n).then_some(Self(n))
    }

    pub fn all() -> impl Iterator<Item = Stage> {
        (Self::MIN..=Self::MAX).map(Stage)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StudyType {
    Morning,
    Evening,
}

impl StudyType {
    pub const ALL: [StudyType; 2] = [StudyType::Morning, StudyType::Evening];

    pub fn label(self) -> &'static str {
        match self {
            StudyType::Morning => "صباحية",
            StudyType::Evening => "مسائية",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            StudyType::Morning => "AM",
            StudyType::Evening => "PM",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TicketStatus {
    New,
    Assigned,
    WaitingStudent,
    Resolved,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::New => "NEW",
            TicketStatus::Assigned => "ASSIGNED",
            TicketStatus::WaitingStudent => "WAITING_STUDENT",
            TicketStatus::Resolved => "RESOLVED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(TicketStatus::New),
            "ASSIGNED" => Some(TicketStatus::Assigned),
            "WAITING_STUDENT" => Some(TicketStatus::WaitingStudent),
            "RESOLVED" => Some(TicketStatus::Resolved),
            _ => None,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an administrator's next free-text message will be used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PendingKind {
    AskMore,
    SendSolution,
}

impl PendingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PendingKind::AskMore => "ASK_MORE",
            PendingKind::SendSolution => "SEND_SOLUTION",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ASK_MORE" => Some(PendingKind::AskMore),
            "SEND_SOLUTION" => Some(PendingKind::SendSolution),
            _ => None,
        }
    }
}

/// A persisted support ticket. Snapshots are read-only; the store owns rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub id: TicketId,
    pub student_chat_id: ChatId,
    pub student_fullname: String,
    pub department: Department,
    pub stage: Stage,
    pub study_type: StudyType,
    pub description: String,
    pub photo_file_id: Option<String>,
    /// Raw status column. Writes are not validated, see [`Ticket::status`].
    pub status: String,
    pub admin_chat_id: ChatId,
    pub created_at: String,
    pub updated_at: String,
}

impl Ticket {
    pub fn status(&self) -> Option<TicketStatus> {
        TicketStatus::parse(&self.status)
    }
}

/// Fields needed to insert a ticket; id, status and timestamps come from the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTicket {
    pub student_chat_id: ChatId,
    pub student_fullname: String,
    pub department: Department,
    pub stage: Stage,
    pub study_type: StudyType,
    pub description: String,
    pub photo_file_id: Option<String>,
    pub admin_chat_id: ChatId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdminPending {
    pub admin_chat_id: ChatId,
    pub kind: PendingKind,
    pub ticket_id: TicketId,
}
