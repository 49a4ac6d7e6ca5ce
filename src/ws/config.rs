use bon::Builder;

const DEFAULT_SEND_COMMAND_EVENT: &str = "send command";
const DEFAULT_SET_STATE_EVENT: &str = "set state";
const DEFAULT_LOGS_EVENT: &str = "send logs";
const DEFAULT_STATS_EVENT: &str = "send stats";
const DEFAULT_STATUS_EVENT: &str = "status";

/// Configuration for WebSocket client behavior.
#[non_exhaustive]
#[derive(Debug, Clone, Default, Builder)]
pub struct Config {
    /// Outbound event names used by the convenience senders
    #[builder(default)]
    pub events: EventNames,
}

/// Wire names of the outbound events sent by the convenience senders.
///
/// The defaults match the Wings console protocol. `auth` and `token expiring` are not
/// configurable.
///
/// ```
/// use pterodactyl_client_sdk::ws::config::{Config, EventNames};
///
/// let config = Config::builder()
///     .events(EventNames::builder().send_command("send").build())
///     .build();
/// assert_eq!(config.events.send_command, "send");
/// assert_eq!(config.events.stats, "send stats");
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
pub struct EventNames {
    /// Runs a console command, args `[command]`
    #[builder(default = DEFAULT_SEND_COMMAND_EVENT.to_owned())]
    pub send_command: String,
    /// Changes the power state, args `[signal]`
    #[builder(default = DEFAULT_SET_STATE_EVENT.to_owned())]
    pub set_state: String,
    /// Asks for recent console output
    #[builder(default = DEFAULT_LOGS_EVENT.to_owned())]
    pub logs: String,
    /// Asks for resource usage
    #[builder(default = DEFAULT_STATS_EVENT.to_owned())]
    pub stats: String,
    /// Asks for the current power state
    #[builder(default = DEFAULT_STATUS_EVENT.to_owned())]
    pub status: String,
}

impl Default for EventNames {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_event_names() {
        let events = Config::default().events;

        assert_eq!(events.send_command, "send command");
        assert_eq!(events.set_state, "set state");
        assert_eq!(events.logs, "send logs");
        assert_eq!(events.stats, "send stats");
        assert_eq!(events.status, "status");
    }

    #[test]
    fn builder_overrides_single_event() {
        let events = EventNames::builder().logs("console output").build();

        assert_eq!(events.logs, "console output");
        assert_eq!(events, EventNames { logs: "console output".to_owned(), ..EventNames::default() });
    }
}
