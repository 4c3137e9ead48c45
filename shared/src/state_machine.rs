//! Appliance Link State Machine
//!
//! Defines valid transitions of the single appliance link, from scanning
//! through the authenticate-then-command choreography back to idle.

/// Phase of the appliance link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No link open
    Idle,
    /// Adapter powered, looking for the appliance address
    Scanning,
    /// Appliance found, scanning stopped
    Discovered,
    /// Opening the link
    Connecting,
    /// Resolving the auth and command characteristics
    ServiceDiscovery,
    /// Authentication key being written
    Authenticating,
    /// Waiting to write, or having written, the brew command
    CommandPending,
    /// Closing the link
    Disconnecting,
}

impl LinkState {
    /// Whether a link to the appliance is open or being opened
    pub fn is_linked(self) -> bool {
        matches!(
            self,
            LinkState::Connecting
                | LinkState::ServiceDiscovery
                | LinkState::Authenticating
                | LinkState::CommandPending
                | LinkState::Disconnecting
        )
    }
}

/// Events that can trigger link transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// Adapter powered on and scanning started
    ScanStarted,
    /// Appliance address seen
    PeripheralFound,
    /// Scan ended without finding the appliance
    ScanFailed,
    /// Actuation requested
    ConnectRequested,
    /// Link established
    Connected,
    /// Auth and command characteristics resolved
    ServicesResolved,
    /// Authentication key sent
    AuthKeySent,
    /// Brew command sent and settle delay elapsed
    CommandSent,
    /// A step failed; the link is forced closed
    Failed,
    /// We closed the link
    LinkClosed,
    /// The peripheral or adapter dropped the link
    LinkLost,
}

/// Result of a state transition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition was valid and state changed
    Success(LinkState),
    /// Transition was invalid from current state
    Invalid { from: LinkState, event: LinkEvent },
}

/// State machine of the appliance link
#[derive(Debug)]
pub struct LinkStateMachine {
    current_state: LinkState,
    /// A peripheral handle has been bound by a successful scan
    bound: bool,
}

impl Default for LinkStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkStateMachine {
    /// Create a new state machine in Idle state with nothing bound
    pub fn new() -> Self {
        Self {
            current_state: LinkState::Idle,
            bound: false,
        }
    }

    pub fn state(&self) -> LinkState {
        self.current_state
    }

    /// Whether the appliance has been discovered
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Process an event and return the transition result
    pub fn process_event(&mut self, event: LinkEvent) -> TransitionResult {
        // Losing the link wins from any linked state
        if event == LinkEvent::LinkLost && self.current_state.is_linked() {
            self.current_state = LinkState::Idle;
            return TransitionResult::Success(LinkState::Idle);
        }

        match self.get_next_state(event) {
            Some(state) => {
                if event == LinkEvent::PeripheralFound {
                    self.bound = true;
                }
                self.current_state = state;
                TransitionResult::Success(state)
            }
            None => TransitionResult::Invalid {
                from: self.current_state,
                event,
            },
        }
    }

    /// Get the next state for a given event, if the transition is valid
    fn get_next_state(&self, event: LinkEvent) -> Option<LinkState> {
        use LinkEvent::*;
        use LinkState::*;

        match (self.current_state, event) {
            // Discovery
            (Idle, ScanStarted) => Some(Scanning),
            (Scanning, PeripheralFound) => Some(Discovered),
            (Scanning, ScanFailed) => Some(Idle),

            // Actuation needs a bound peripheral
            (Idle | Discovered, ConnectRequested) if self.bound => Some(Connecting),

            (Connecting, Connected) => Some(ServiceDiscovery),
            // Nothing open yet
            (Connecting, Failed) => Some(Idle),

            (ServiceDiscovery, ServicesResolved) => Some(Authenticating),
            (Authenticating, AuthKeySent) => Some(CommandPending),
            (CommandPending, CommandSent) => Some(Disconnecting),

            // Forced disconnect
            (ServiceDiscovery | Authenticating | CommandPending, Failed) => Some(Disconnecting),

            (Disconnecting, LinkClosed) => Some(Idle),

            // Invalid transition
            _ => None,
        }
    }
}
