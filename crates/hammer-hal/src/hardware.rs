//! [`Hardware`] – the set of device drivers the behavior core runs against.

use crate::drive::{DriveDevice, Implement};
use crate::indicator::Indicator;
use crate::sensor::RangeSensor;

/// Owned driver bundle handed to the coordinator at startup.
///
/// Each driver is moved behind its own lock by the runtime, so the drive,
/// the implement, the range sensor and the indicators can be used
/// concurrently while each individual device is still accessed by one
/// caller at a time.
pub struct Hardware {
    pub drive: Box<dyn DriveDevice>,
    pub implement: Box<dyn Implement>,
    pub range: Box<dyn RangeSensor>,
    pub indicator: Box<dyn Indicator>,
}

impl Hardware {
    pub fn new(
        drive: Box<dyn DriveDevice>,
        implement: Box<dyn Implement>,
        range: Box<dyn RangeSensor>,
        indicator: Box<dyn Indicator>,
    ) -> Self {
        Self {
            drive,
            implement,
            range,
            indicator,
        }
    }
}

impl std::fmt::Debug for Hardware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hardware")
            .field("drive", &self.drive.id())
            .field("implement", &self.implement.id())
            .field("range", &self.range.id())
            .finish_non_exhaustive()
    }
}
