//
// Copyright 2024 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

use std::time::SystemTime;

use crate::tcb_info::TcbInfo;

pub(crate) trait Expireable {
    fn valid_at(&self, timestamp: SystemTime) -> bool;
}

/// A TCB info document is valid from its issue date up to, but not
/// including, its scheduled next update.
impl Expireable for TcbInfo {
    fn valid_at(&self, timestamp: SystemTime) -> bool {
        let issued = SystemTime::from(self.issue_date);
        let next_update = SystemTime::from(self.next_update);
        issued <= timestamp && timestamp < next_update
    }
}
