// ── Sequencer event types ──
//
// The complete set of event type codes the sequencer can deliver. Only a
// couple of them drive reconciliation, but every code has to be
// representable so the event pump never drops or misreads one.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::error::Error;

/// Type of a sequencer event, with the sequencer's numeric code as the
/// discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, Serialize, Deserialize)]
#[repr(u8)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    // System status
    System = 0,
    Result = 1,

    // Note events
    Note = 5,
    #[strum(serialize = "NOTEON")]
    NoteOn = 6,
    #[strum(serialize = "NOTEOFF")]
    NoteOff = 7,
    #[strum(serialize = "KEYPRESS")]
    KeyPress = 8,

    // Control events
    Controller = 10,
    #[strum(serialize = "PGMCHANGE")]
    PgmChange = 11,
    #[strum(serialize = "CHANPRESS")]
    ChanPress = 12,
    #[strum(serialize = "PITCHBEND")]
    PitchBend = 13,
    #[strum(serialize = "CONTROL14")]
    Control14 = 14,
    #[strum(serialize = "NONREGPARAM")]
    NonRegParam = 15,
    #[strum(serialize = "REGPARAM")]
    RegParam = 16,

    // Song/timing
    #[strum(serialize = "SONGPOS")]
    SongPos = 20,
    #[strum(serialize = "SONGSEL")]
    SongSel = 21,
    #[strum(serialize = "QFRAME")]
    QFrame = 22,
    #[strum(serialize = "TIMESIGN")]
    TimeSign = 23,
    #[strum(serialize = "KEYSIGN")]
    KeySign = 24,

    // Queue control
    Start = 30,
    Continue = 31,
    Stop = 32,
    SetposTick = 33,
    SetposTime = 34,
    Tempo = 35,
    Clock = 36,
    Tick = 37,
    QueueSkew = 38,
    SyncPos = 39,

    // Realtime without data
    TuneRequest = 40,
    Reset = 41,
    Sensing = 42,

    Echo = 50,
    Oss = 51,

    // Client/port lifecycle (delivered through the system announce port)
    ClientStart = 60,
    ClientExit = 61,
    ClientChange = 62,
    PortStart = 63,
    PortExit = 64,
    PortChange = 65,
    PortSubscribed = 66,
    PortUnsubscribed = 67,

    // User-defined, fixed size
    #[strum(serialize = "USR0")]
    Usr0 = 90,
    #[strum(serialize = "USR1")]
    Usr1 = 91,
    #[strum(serialize = "USR2")]
    Usr2 = 92,
    #[strum(serialize = "USR3")]
    Usr3 = 93,
    #[strum(serialize = "USR4")]
    Usr4 = 94,
    #[strum(serialize = "USR5")]
    Usr5 = 95,
    #[strum(serialize = "USR6")]
    Usr6 = 96,
    #[strum(serialize = "USR7")]
    Usr7 = 97,
    #[strum(serialize = "USR8")]
    Usr8 = 98,
    #[strum(serialize = "USR9")]
    Usr9 = 99,

    // Variable length
    Sysex = 130,
    Bounce = 131,
    #[strum(serialize = "USR_VAR0")]
    UsrVar0 = 135,
    #[strum(serialize = "USR_VAR1")]
    UsrVar1 = 136,
    #[strum(serialize = "USR_VAR2")]
    UsrVar2 = 137,
    #[strum(serialize = "USR_VAR3")]
    UsrVar3 = 138,
    #[strum(serialize = "USR_VAR4")]
    UsrVar4 = 139,

    None = 255,
}

impl EventKind {
    /// The sequencer's numeric code for this event type.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Client/port lifecycle notification from the system announce port.
    pub const fn is_announcement(self) -> bool {
        matches!(self.code(), 60..=67)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &'static str = self.into();
        write!(f, "EVENT_{name}")
    }
}

impl TryFrom<u8> for EventKind {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::iter()
            .find(|kind| kind.code() == code)
            .ok_or(Error::UnknownEventType(code))
    }
}

// ── Tests ────────────────────────────────────────────────────────────
