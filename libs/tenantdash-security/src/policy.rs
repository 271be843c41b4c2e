use serde::{Deserialize, Serialize};

/// How far a vendor can see into the company's job list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorJobVisibility {
    /// Every job of the vendor's company.
    #[default]
    CompanyWide,
    /// Only jobs whose `vendorId` equals the vendor's uid.
    VendorFiltered,
}

/// Tunable parts of the access rule set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessPolicy {
    pub vendor_job_visibility: VendorJobVisibility,
}

impl AccessPolicy {
    #[must_use]
    pub fn with_vendor_job_visibility(mut self, visibility: VendorJobVisibility) -> Self {
        self.vendor_job_visibility = visibility;
        self
    }

    #[must_use]
    pub fn vendor_jobs_filtered(&self) -> bool {
        self.vendor_job_visibility == VendorJobVisibility::VendorFiltered
    }
}
