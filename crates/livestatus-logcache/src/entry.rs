//! Parsed history log lines.
//!
//! A history line looks like `[1700000000] HOST ALERT: web01;DOWN;HARD;3;timeout`:
//! an epoch timestamp in brackets, a message type, and `;`-separated fields.
//! Lines without the bracketed timestamp are invalid and never become entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::LogClass;

/// The message type of a history line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEntryKind {
    /// `HOST ALERT`
    HostAlert,
    /// `SERVICE ALERT`
    ServiceAlert,
    /// `HOST DOWNTIME ALERT`
    HostDowntimeAlert,
    /// `SERVICE DOWNTIME ALERT`
    ServiceDowntimeAlert,
    /// `HOST FLAPPING ALERT`
    HostFlappingAlert,
    /// `SERVICE FLAPPING ALERT`
    ServiceFlappingAlert,
    /// `HOST ACKNOWLEDGE ALERT`
    HostAcknowledgeAlert,
    /// `SERVICE ACKNOWLEDGE ALERT`
    ServiceAcknowledgeAlert,
    /// `HOST NOTIFICATION`
    HostNotification,
    /// `SERVICE NOTIFICATION`
    ServiceNotification,
    /// `HOST NOTIFICATION RESULT`
    HostNotificationResult,
    /// `SERVICE NOTIFICATION RESULT`
    ServiceNotificationResult,
    /// `HOST NOTIFICATION PROGRESS`
    HostNotificationProgress,
    /// `SERVICE NOTIFICATION PROGRESS`
    ServiceNotificationProgress,
    /// `PASSIVE HOST CHECK`
    PassiveHostCheck,
    /// `PASSIVE SERVICE CHECK`
    PassiveServiceCheck,
    /// `EXTERNAL COMMAND`
    ExternalCommand,
    /// `INITIAL HOST STATE`
    InitialHostState,
    /// `CURRENT HOST STATE`
    CurrentHostState,
    /// `INITIAL SERVICE STATE`
    InitialServiceState,
    /// `CURRENT SERVICE STATE`
    CurrentServiceState,
    /// `TIMEPERIOD TRANSITION`
    TimeperiodTransition,
    /// `HOST ALERT HANDLER STARTED`
    HostAlertHandlerStarted,
    /// `SERVICE ALERT HANDLER STARTED`
    ServiceAlertHandlerStarted,
    /// `HOST ALERT HANDLER STOPPED`
    HostAlertHandlerStopped,
    /// `SERVICE ALERT HANDLER STOPPED`
    ServiceAlertHandlerStopped,
    /// `LOG VERSION`
    LogVersion,
    /// `LOG INITIAL STATES`
    LogInitialStates,
    /// Core startup banner
    CoreStarting,
    /// Core shutdown
    CoreStopping,
    /// Core restart after SIGHUP
    CoreRestarting,
    /// Message type not known to the parser
    Other,
    /// Text without a message type
    Text,
}

/// Message types followed by `: ` and their kinds.
const MESSAGE_TYPES: [(&str, LogEntryKind); 27] = [
    ("HOST ALERT", LogEntryKind::HostAlert),
    ("SERVICE ALERT", LogEntryKind::ServiceAlert),
    ("HOST DOWNTIME ALERT", LogEntryKind::HostDowntimeAlert),
    ("SERVICE DOWNTIME ALERT", LogEntryKind::ServiceDowntimeAlert),
    ("HOST FLAPPING ALERT", LogEntryKind::HostFlappingAlert),
    ("SERVICE FLAPPING ALERT", LogEntryKind::ServiceFlappingAlert),
    ("HOST ACKNOWLEDGE ALERT", LogEntryKind::HostAcknowledgeAlert),
    ("SERVICE ACKNOWLEDGE ALERT", LogEntryKind::ServiceAcknowledgeAlert),
    ("HOST NOTIFICATION", LogEntryKind::HostNotification),
    ("SERVICE NOTIFICATION", LogEntryKind::ServiceNotification),
    ("HOST NOTIFICATION RESULT", LogEntryKind::HostNotificationResult),
    ("SERVICE NOTIFICATION RESULT", LogEntryKind::ServiceNotificationResult),
    ("HOST NOTIFICATION PROGRESS", LogEntryKind::HostNotificationProgress),
    ("SERVICE NOTIFICATION PROGRESS", LogEntryKind::ServiceNotificationProgress),
    ("PASSIVE HOST CHECK", LogEntryKind::PassiveHostCheck),
    ("PASSIVE SERVICE CHECK", LogEntryKind::PassiveServiceCheck),
    ("EXTERNAL COMMAND", LogEntryKind::ExternalCommand),
    ("INITIAL HOST STATE", LogEntryKind::InitialHostState),
    ("CURRENT HOST STATE", LogEntryKind::CurrentHostState),
    ("INITIAL SERVICE STATE", LogEntryKind::InitialServiceState),
    ("CURRENT SERVICE STATE", LogEntryKind::CurrentServiceState),
    ("TIMEPERIOD TRANSITION", LogEntryKind::TimeperiodTransition),
    ("HOST ALERT HANDLER STARTED", LogEntryKind::HostAlertHandlerStarted),
    ("SERVICE ALERT HANDLER STARTED", LogEntryKind::ServiceAlertHandlerStarted),
    ("HOST ALERT HANDLER STOPPED", LogEntryKind::HostAlertHandlerStopped),
    ("SERVICE ALERT HANDLER STOPPED", LogEntryKind::ServiceAlertHandlerStopped),
    ("LOG VERSION", LogEntryKind::LogVersion),
];

/// Program messages that carry no `TYPE: ` header.
const PROGRAM_MARKERS: [(&str, LogEntryKind); 8] = [
    ("LOG INITIAL STATES", LogEntryKind::LogInitialStates),
    ("logging initial states", LogEntryKind::LogInitialStates),
    ("Nagios ", LogEntryKind::CoreStarting),
    ("Icinga ", LogEntryKind::CoreStarting),
    ("Caught SIGHUP", LogEntryKind::CoreRestarting),
    ("Caught SIGTERM", LogEntryKind::CoreStopping),
    ("Successfully shutdown", LogEntryKind::CoreStopping),
    ("Event loop ended", LogEntryKind::CoreStopping),
];

impl LogEntryKind {
    /// Returns the class this kind belongs to.
    #[must_use]
    pub const fn class(self) -> LogClass {
        match self {
            Self::HostAlert
            | Self::ServiceAlert
            | Self::HostDowntimeAlert
            | Self::ServiceDowntimeAlert
            | Self::HostFlappingAlert
            | Self::ServiceFlappingAlert
            | Self::HostAcknowledgeAlert
            | Self::ServiceAcknowledgeAlert => LogClass::Alert,
            Self::HostNotification
            | Self::ServiceNotification
            | Self::HostNotificationResult
            | Self::ServiceNotificationResult
            | Self::HostNotificationProgress
            | Self::ServiceNotificationProgress => LogClass::HsNotification,
            Self::PassiveHostCheck | Self::PassiveServiceCheck => LogClass::PassiveCheck,
            Self::ExternalCommand => LogClass::ExtCommand,
            Self::InitialHostState
            | Self::CurrentHostState
            | Self::InitialServiceState
            | Self::CurrentServiceState
            | Self::TimeperiodTransition => LogClass::State,
            Self::HostAlertHandlerStarted
            | Self::ServiceAlertHandlerStarted
            | Self::HostAlertHandlerStopped
            | Self::ServiceAlertHandlerStopped => LogClass::AlertHandlers,
            Self::LogVersion
            | Self::LogInitialStates
            | Self::CoreStarting
            | Self::CoreStopping
            | Self::CoreRestarting => LogClass::Program,
            Self::Other => LogClass::Info,
            Self::Text => LogClass::Text,
        }
    }

    const fn is_service(self) -> bool {
        matches!(
            self,
            Self::ServiceAlert
                | Self::ServiceDowntimeAlert
                | Self::ServiceFlappingAlert
                | Self::ServiceAcknowledgeAlert
                | Self::ServiceNotification
                | Self::ServiceNotificationResult
                | Self::ServiceNotificationProgress
                | Self::PassiveServiceCheck
                | Self::InitialServiceState
                | Self::CurrentServiceState
                | Self::ServiceAlertHandlerStarted
                | Self::ServiceAlertHandlerStopped
        )
    }
}

/// One parsed history line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Line number within its file, starting at 1
    pub lineno: usize,
    /// Timestamp from the bracketed prefix
    pub time: DateTime<Utc>,
    /// Class derived from the kind
    pub class: LogClass,
    /// Message type
    pub kind: LogEntryKind,
    /// The complete line without trailing newline
    pub message: String,
    /// Host the line refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    /// Service the line refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_description: Option<String>,
    /// Numeric state (0 = OK/UP)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<i32>,
    /// `HARD`/`SOFT`, `STARTED`/`STOPPED`, or the raw notification type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_type: Option<String>,
    /// Check attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
    /// Check or handler output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_output: Option<String>,
    /// Notified or acknowledging contact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    /// Notification, handler or external command name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_name: Option<String>,
    /// Downtime, flapping or acknowledgement comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl LogEntry {
    /// Parses a history line, returning `None` for invalid lines.
    #[must_use]
    pub fn parse(lineno: usize, line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let (time, text) = split_timestamp(line)?;

        let mut entry = Self {
            lineno,
            time,
            class: LogClass::Text,
            kind: LogEntryKind::Text,
            message: line.to_string(),
            host_name: None,
            service_description: None,
            state: None,
            state_type: None,
            attempt: None,
            plugin_output: None,
            contact_name: None,
            command_name: None,
            comment: None,
        };
        entry.classify(text);
        Some(entry)
    }

    /// Extracts only the timestamp of a history line.
    #[must_use]
    pub fn timestamp_of(line: &str) -> Option<DateTime<Utc>> {
        split_timestamp(line.trim_end_matches(['\n', '\r'])).map(|(time, _)| time)
    }

    /// Returns the message without its timestamp prefix.
    #[must_use]
    pub fn text(&self) -> &str {
        split_timestamp(&self.message).map_or("", |(_, text)| text)
    }

    fn classify(&mut self, text: &str) {
        if let Some((message_type, args)) = text.split_once(": ") {
            if let Some((_, kind)) = MESSAGE_TYPES.iter().find(|(t, _)| *t == message_type) {
                self.set_kind(*kind);
                self.extract_fields(args);
                return;
            }
        }

        if let Some((_, kind)) = PROGRAM_MARKERS.iter().find(|(m, _)| text.starts_with(m)) {
            self.set_kind(*kind);
            return;
        }

        if text.contains(": ") {
            self.set_kind(LogEntryKind::Other);
        } else {
            self.set_kind(LogEntryKind::Text);
        }
    }

    fn set_kind(&mut self, kind: LogEntryKind) {
        self.kind = kind;
        self.class = kind.class();
    }

    fn extract_fields(&mut self, args: &str) {
        use LogEntryKind as K;

        let service = self.kind.is_service();
        let mut fields = args.split(';');
        let mut next = || fields.next().map(str::to_string);

        match self.kind {
            K::HostAlert
            | K::ServiceAlert
            | K::InitialHostState
            | K::CurrentHostState
            | K::InitialServiceState
            | K::CurrentServiceState => {
                self.host_name = next();
                if service {
                    self.service_description = next();
                }
                let state = next();
                self.state = state.as_deref().and_then(|s| parse_state(s, service));
                self.state_type = next();
                self.attempt = next().and_then(|a| a.trim().parse().ok());
                self.plugin_output = rest(args, if service { 5 } else { 4 });
            }
            K::HostDowntimeAlert
            | K::ServiceDowntimeAlert
            | K::HostFlappingAlert
            | K::ServiceFlappingAlert => {
                self.host_name = next();
                if service {
                    self.service_description = next();
                }
                self.state_type = next();
                self.comment = rest(args, if service { 3 } else { 2 });
            }
            K::HostAcknowledgeAlert | K::ServiceAcknowledgeAlert => {
                self.host_name = next();
                if service {
                    self.service_description = next();
                }
                self.state_type = next();
                self.contact_name = next();
                self.comment = rest(args, if service { 4 } else { 3 });
            }
            K::HostNotification
            | K::ServiceNotification
            | K::HostNotificationResult
            | K::ServiceNotificationResult
            | K::HostNotificationProgress
            | K::ServiceNotificationProgress => {
                self.contact_name = next();
                self.host_name = next();
                if service {
                    self.service_description = next();
                }
                let state_type = next();
                self.state = state_type
                    .as_deref()
                    .and_then(|s| parse_notification_state(s, service));
                self.state_type = state_type;
                self.command_name = next();
                self.plugin_output = rest(args, if service { 5 } else { 4 });
            }
            K::PassiveHostCheck | K::PassiveServiceCheck => {
                self.host_name = next();
                if service {
                    self.service_description = next();
                }
                self.state = next().and_then(|s| s.trim().parse().ok());
                self.plugin_output = rest(args, if service { 3 } else { 2 });
            }
            K::ExternalCommand => {
                self.command_name = next();
            }
            K::HostAlertHandlerStarted | K::ServiceAlertHandlerStarted => {
                self.host_name = next();
                if service {
                    self.service_description = next();
                }
                self.command_name = next();
            }
            K::HostAlertHandlerStopped | K::ServiceAlertHandlerStopped => {
                self.host_name = next();
                if service {
                    self.service_description = next();
                }
                self.command_name = next();
                self.state = next().and_then(|s| s.trim().parse().ok());
                self.plugin_output = rest(args, if service { 4 } else { 3 });
            }
            K::TimeperiodTransition => {
                self.comment = Some(args.to_string());
            }
            _ => {}
        }
    }
}

/// Splits `[<secs>] <text>` into timestamp and text.
fn split_timestamp(line: &str) -> Option<(DateTime<Utc>, &str)> {
    let rest = line.strip_prefix('[')?;
    let (secs, text) = rest.split_once("] ")?;
    if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let time = DateTime::from_timestamp(secs.parse().ok()?, 0)?;
    Some((time, text))
}

/// Everything after the first `skip` fields, keeping embedded `;`.
fn rest(args: &str, skip: usize) -> Option<String> {
    args.splitn(skip + 1, ';').nth(skip).map(str::to_string)
}

fn parse_state(state: &str, service: bool) -> Option<i32> {
    let state = state.trim();
    if service {
        match state {
            "OK" => Some(0),
            "WARNING" => Some(1),
            "CRITICAL" => Some(2),
            "UNKNOWN" => Some(3),
            _ => None,
        }
    } else {
        match state {
            "UP" => Some(0),
            "DOWN" => Some(1),
            "UNREACHABLE" => Some(2),
            _ => None,
        }
    }
}

/// Notification types are either a plain state or `TYPE (STATE)`.
fn parse_notification_state(state_type: &str, service: bool) -> Option<i32> {
    let inner = state_type
        .split_once('(')
        .and_then(|(_, tail)| tail.strip_suffix(')'))
        .unwrap_or(state_type);
    parse_state(inner, service)
}
