use crate::rbac_ports::RbacStats;

use super::*;

impl RbacAdminService {
    /// Returns RBAC counts for operational dashboards.
    pub async fn statistics(&self) -> AppResult<RbacStats> {
        self.statistics.rbac_statistics(self.clock.now()).await
    }
}
