//! wp-unclaimed - WordPress dependency confusion scanner
//!
//! Scrapes WordPress sites for the plugin slugs they reference, then checks
//! each slug against the official plugin registry. A slug a live site loads
//! but nobody has claimed can be registered by anyone, who then ships code
//! to every site still referencing it.
//!
//! # Example
//!
//! ```no_run
//! use wp_unclaimed::{Report, Scan};
//!
//! #[tokio::main]
//! async fn main() -> wp_unclaimed::Result<()> {
//!     let scan = Scan::builder(vec!["https://example.com".to_string()]).build()?;
//!     let outcome = scan.run().await;
//!     let report = Report::build(&outcome);
//!     for entry in &report.sites {
//!         println!("{}: {}", entry.site, entry.unclaimed_plugins.join(", "));
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod registry;
pub mod report;
pub mod scan;

pub use error::{Error, Result};
pub use extract::extract_slugs;
pub use fetch::{FetchClient, FetchedPage};
pub use output::{render_inventory, render_json, render_report, write_json_report};
pub use registry::{ClaimChecker, ClaimStatus, claim_url};
pub use report::{PluginVerdict, Report, SiteInventory, SiteReport};
pub use scan::{DEFAULT_WORKERS, Scan, ScanBuilder, ScanEvent, ScanOutcome};
