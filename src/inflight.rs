//! In-flight Tracking
//!
//! One flag per logical operation. A flag is held by an RAII guard for the
//! lifetime of the request; the front end reads the flags to disable the
//! matching control. Operations do not block each other.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::StudioError;

/// Logical operations that issue backend requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SendMessage,
    Generate,
    Edit,
    Refine,
    Save,
    Submit,
    LoadProjects,
    Feedback,
    SimulateFeedback,
    Tracker,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::SendMessage => "Sending a message",
            Operation::Generate => "Generating a mockup",
            Operation::Edit => "Editing",
            Operation::Refine => "Refining",
            Operation::Save => "Saving",
            Operation::Submit => "Ticket submission",
            Operation::LoadProjects => "Loading projects",
            Operation::Feedback => "Feedback",
            Operation::SimulateFeedback => "Feedback simulation",
            Operation::Tracker => "Loading the tracker board",
        };
        f.write_str(name)
    }
}

/// Set of operations with a request outstanding
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    active: Arc<Mutex<HashSet<Operation>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag for `op`, failing if it is already held
    pub fn try_begin(&self, op: Operation) -> Result<InFlightGuard, StudioError> {
        let mut active = self.lock();
        if !active.insert(op) {
            return Err(StudioError::Busy(op));
        }
        Ok(InFlightGuard {
            active: Arc::clone(&self.active),
            op,
        })
    }

    pub fn is_busy(&self, op: Operation) -> bool {
        self.lock().contains(&op)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<Operation>> {
        // A poisoned set only means a panic elsewhere; the flags are still valid
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Clears its operation's flag when dropped
#[derive(Debug)]
pub struct InFlightGuard {
    active: Arc<Mutex<HashSet<Operation>>>,
    op: Operation,
}

impl InFlightGuard {
    pub fn operation(&self) -> Operation {
        self.op
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.remove(&self.op);
    }
}
