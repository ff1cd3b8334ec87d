//! Hyper-V status code tables.
//!
//! Each table is a closed enumeration over the documented codes of one
//! `Msvm_ComputerSystem` property. Codes outside the table map to
//! `Unmapped(code)`, which has no label and serializes as null.

use serde::{Serialize, Serializer};

macro_rules! status_table {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($code:literal => $variant:ident = $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// Code not in the documented table.
            Unmapped(i64),
        }

        impl $name {
            /// Maps a raw code onto the table.
            pub fn from_code(code: i64) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Unmapped(other),
                }
            }

            /// Returns the raw code.
            pub fn code(&self) -> i64 {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Unmapped(code) => *code,
                }
            }

            /// Returns the human-readable label, or `None` for unmapped codes.
            pub fn label(&self) -> Option<&'static str> {
                match self {
                    $(Self::$variant => Some($label),)+
                    Self::Unmapped(_) => None,
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                self.label().serialize(serializer)
            }
        }
    };
}

status_table! {
    /// `CommunicationStatus`
    CommunicationStatus {
        0 => Unknown = "Unknown",
        1 => NotAvailable = "Not Available",
        2 => Ok = "Communication OK",
        3 => LostCommunication = "Lost Communication",
        4 => NoContact = "No Contact",
    }
}

status_table! {
    /// `DetailedStatus`
    DetailedStatus {
        0 => NotAvailable = "Not Available",
        1 => NoAdditionalInformation = "No Additional Information",
        2 => Stressed = "Stressed",
        3 => PredictiveFailure = "Predictive Failure",
        4 => NonRecoverableError = "Non-Recoverable Error",
        5 => SupportingEntityInError = "Supporting Entity in Error",
    }
}

status_table! {
    /// `EnabledDefault`
    EnabledDefault {
        2 => Enabled = "Enabled",
        3 => Disabled = "Disabled",
        6 => EnabledButOffline = "Enabled but Offline",
    }
}

status_table! {
    /// `EnabledState`
    EnabledState {
        0 => Unknown = "Unknown",
        1 => Other = "Other",
        2 => Enabled = "Enabled",
        3 => Disabled = "Disabled",
        4 => ShuttingDown = "Shutting Down",
        5 => NotApplicable = "Not Applicable",
        6 => EnabledButOffline = "Enabled but Offline",
        7 => InTest = "In Test",
        8 => Deferred = "Deferred",
        9 => Quiesce = "Quiesce",
        10 => Starting = "Starting",
    }
}

status_table! {
    /// `EnhancedSessionModeState`
    EnhancedSessionModeState {
        2 => AllowedAndAvailable = "Allowed and available",
        3 => NotAllowed = "Not allowed",
        6 => AllowedButNotAvailable = "Allowed but not available",
    }
}

status_table! {
    /// `HealthState`
    ///
    /// A guest that pauses on critically low disk space reports 25 here
    /// together with EnabledState 32768.
    HealthState {
        5 => Ok = "OK",
        20 => MajorFailure = "Major Failure",
        25 => CriticalFailure = "Critical failure",
    }
}

status_table! {
    /// `OperatingStatus`
    OperatingStatus {
        0 => Unknown = "Unknown",
        1 => NotAvailable = "Not Available",
        2 => Servicing = "Servicing",
        3 => Starting = "Starting",
        4 => Stopping = "Stopping",
        5 => Stopped = "Stopped",
        6 => Aborted = "Aborted",
        7 => Dormant = "Dormant",
        8 => Completed = "Completed",
        9 => Migrating = "Migrating",
        10 => Emigrating = "Emigrating",
        11 => Immigrating = "Immigrating",
        12 => Snapshotting = "Snapshotting",
        13 => ShuttingDown = "Shutting Down",
        14 => InTest = "In Test",
        15 => Transitioning = "Transitioning",
        16 => InService = "In Service",
    }
}

status_table! {
    /// First element of `OperationalStatus`.
    OperationalStatus {
        2 => Ok = "OK",
        3 => Degraded = "Degraded",
        5 => PredictiveFailure = "Predictive Failure",
        10 => Stopped = "Stopped",
        11 => InService = "In Service",
        15 => Dormant = "Dormant",
    }
}

status_table! {
    /// Second element of `OperationalStatus`.
    OperationalStatusMore {
        32768 => CreatingSnapshot = "Creating Snapshot",
        32769 => ApplyingSnapshot = "Applying Snapshot",
        32770 => DeletingSnapshot = "Deleting Snapshot",
        32771 => WaitingToStart = "Waiting to Start",
        32772 => MergingDisks = "Merging Disks",
        32773 => ExportingVirtualMachine = "Exporting Virtual Machine",
        32774 => MigratingVirtualMachine = "Migrating Virtual Machine",
    }
}

status_table! {
    /// `PrimaryStatus`
    PrimaryStatus {
        0 => Unknown = "Unknown",
        1 => Ok = "OK",
        2 => Degraded = "Degraded",
        3 => Error = "Error",
    }
}

status_table! {
    /// `ReplicationMode`
    ReplicationMode {
        0 => None = "None",
        1 => Primary = "Primary",
        2 => Replica = "Replica",
        3 => TestReplica = "Test Replica",
        4 => ExtendedReplica = "Extended Replica",
    }
}

status_table! {
    /// `RequestedState`: the EnabledState codes plus 12.
    RequestedState {
        0 => Unknown = "Unknown",
        1 => Other = "Other",
        2 => Enabled = "Enabled",
        3 => Disabled = "Disabled",
        4 => ShuttingDown = "Shutting Down",
        5 => NotApplicable = "Not Applicable",
        6 => EnabledButOffline = "Enabled but Offline",
        7 => InTest = "In Test",
        8 => Deferred = "Deferred",
        9 => Quiesce = "Quiesce",
        10 => Starting = "Starting",
        12 => NotApplicableRequest = "Not Applicable",
    }
}
