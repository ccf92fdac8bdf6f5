//! Browser capability consumed by the extractor and orchestrator.

use std::future::Future;
use std::time::Duration;

use crate::error::DriverError;

/// A single browser page the scraper can drive.
///
/// Implementations apply their own per-action timeout to clicks and text
/// reads; only [`PageDriver::wait_visible`] takes an explicit bound. Lookups
/// that find nothing return `Ok(None)` / an empty `Vec` rather than an error.
pub trait PageDriver: Send {
    /// Opaque handle to a DOM element on the current page.
    type Element: Send + Sync;

    fn navigate(&mut self, url: &str) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Number of page-level matches for a CSS selector.
    fn count(&mut self, selector: &str) -> impl Future<Output = Result<usize, DriverError>> + Send;

    /// Waits until the first match of `selector` is visible.
    ///
    /// Returns `Ok(false)` when nothing became visible within `timeout`.
    fn wait_visible(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<bool, DriverError>> + Send;

    /// Scrolls the viewport vertically by `dy` pixels.
    fn scroll_by(&mut self, dy: i64) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// All page-level matches for a CSS selector, in document order.
    fn find_all(
        &mut self,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<Self::Element>, DriverError>> + Send;

    /// First match of a CSS selector inside `scope`.
    fn find_within(
        &mut self,
        scope: &Self::Element,
        selector: &str,
    ) -> impl Future<Output = Result<Option<Self::Element>, DriverError>> + Send;

    /// First element with the given ARIA role whose accessible name contains
    /// `name` (case-insensitive). Searches the whole page when `scope` is `None`.
    fn find_by_role(
        &mut self,
        scope: Option<&Self::Element>,
        role: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<Self::Element>, DriverError>> + Send;

    /// First page-level element whose own text is exactly `text`.
    fn find_by_text(
        &mut self,
        text: &str,
    ) -> impl Future<Output = Result<Option<Self::Element>, DriverError>> + Send;

    fn scroll_into_view(
        &mut self,
        element: &Self::Element,
    ) -> impl Future<Output = Result<(), DriverError>> + Send;

    fn click(
        &mut self,
        element: &Self::Element,
    ) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Rendered text of the element.
    fn inner_text(
        &mut self,
        element: &Self::Element,
    ) -> impl Future<Output = Result<String, DriverError>> + Send;

    fn attribute(
        &mut self,
        element: &Self::Element,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, DriverError>> + Send;

    /// Current text content of the system clipboard.
    fn read_clipboard(&mut self) -> impl Future<Output = Result<String, DriverError>> + Send;

    /// Empties the system clipboard.
    fn clear_clipboard(&mut self) -> impl Future<Output = Result<(), DriverError>> + Send;
}
