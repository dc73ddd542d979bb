//! Swipe and scroll gestures built from pointer action sequences

use log::{info, warn};
use std::time::Duration;

use super::actions::PointerSequence;
use super::error::{DriverError, DriverResult};
use super::traits::{AutomationSession, ElementHandle, Point};

/// Drag duration used by scrolls
pub const SCROLL_DURATION: Duration = Duration::from_millis(600);

/// Where a gesture starts
#[derive(Debug, Clone)]
pub enum GestureOrigin {
    /// Center of an element's bounding box, shifted by an offset
    Element {
        element: ElementHandle,
        offset: (i32, i32),
    },
    /// Absolute viewport coordinate
    Point(Point),
}

impl GestureOrigin {
    pub fn element(element: &ElementHandle) -> Self {
        Self::element_offset(element, 0, 0)
    }

    pub fn element_offset(element: &ElementHandle, dx: i32, dy: i32) -> Self {
        GestureOrigin::Element {
            element: element.clone(),
            offset: (dx, dy),
        }
    }
}

pub struct GestureExecutor<'a> {
    session: &'a dyn AutomationSession,
}

impl<'a> GestureExecutor<'a> {
    pub fn new(session: &'a dyn AutomationSession) -> Self {
        Self { session }
    }

    async fn resolve(&self, origin: &GestureOrigin) -> DriverResult<Point> {
        match origin {
            GestureOrigin::Element { element, offset } => {
                let rect = self.session.element_rect(element).await?;
                Ok(rect.center().offset(offset.0, offset.1))
            }
            GestureOrigin::Point(point) => Ok(*point),
        }
    }

    /// Press at the origin, drag by `(dx, dy)` over `duration`, release.
    ///
    /// Failures propagate: callers may depend on the swipe having happened.
    pub async fn swipe(
        &self,
        origin: &GestureOrigin,
        dx: i32,
        dy: i32,
        duration: Duration,
    ) -> DriverResult<()> {
        let start = self.resolve(origin).await?;
        let end = start.offset(dx, dy);
        let sequence = PointerSequence::drag(start, end, duration)?;

        info!(
            "Swiping from ({}, {}) to ({}, {}) over {}ms",
            start.x,
            start.y,
            end.x,
            end.y,
            duration.as_millis()
        );

        self.session
            .perform_actions(&sequence)
            .await
            .map_err(|e| DriverError::GestureDispatch(Box::new(e)))
    }

    /// Scroll content by `(dx, dy)`: positive `dy` scrolls down, so the
    /// finger moves up.
    ///
    /// Best-effort: failures are logged and swallowed.
    pub async fn scroll(&self, origin: &GestureOrigin, dx: i32, dy: i32) {
        match self.swipe(origin, -dx, -dy, SCROLL_DURATION).await {
            Ok(()) => info!("Scrolled element by X: {}, Y: {}", dx, dy),
            Err(e) => warn!("Failed to scroll element: {}", e),
        }
    }

    /// Vertical swipe along the window's center line, between two fractions
    /// of its height (e.g. `0.95 -> 0.05` drags from bottom to top).
    pub async fn swipe_window(
        &self,
        from_fraction: f64,
        to_fraction: f64,
        duration: Duration,
    ) -> DriverResult<()> {
        let window = self.session.window_rect().await?;
        let x = window.width as i32 / 2;
        let start_y = (window.height * from_fraction) as i32;
        let end_y = (window.height * to_fraction) as i32;

        self.swipe(
            &GestureOrigin::Point(Point::new(x, start_y)),
            0,
            end_y - start_y,
            duration,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testing::{Call, FakeElement, FakeSession};
    use crate::driver::traits::Locator;

    fn image() -> Locator {
        Locator::XPath("//*[contains(@Name, 'been looking for')]".to_string())
    }

    fn session_with_image() -> FakeSession {
        FakeSession::new()
            .with_element(FakeElement::new("img", image()).rect(100.0, 200.0, 200.0, 100.0))
    }

    #[tokio::test]
    async fn test_swipe_from_element_center_with_offset() {
        let session = session_with_image();
        let gestures = GestureExecutor::new(&session);
        let element = ElementHandle("img".to_string());

        gestures
            .swipe(
                &GestureOrigin::element_offset(&element, 200, 0),
                -400,
                0,
                Duration::from_millis(600),
            )
            .await
            .unwrap();

        let dispatched = session.dispatched();
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].start(), Some(Point::new(400, 250)));
        assert_eq!(dispatched[0].end(), Some(Point::new(0, 250)));
    }

    #[tokio::test]
    async fn test_swipe_from_point() {
        let session = FakeSession::new();
        let gestures = GestureExecutor::new(&session);

        gestures
            .swipe(
                &GestureOrigin::Point(Point::new(10, 10)),
                5,
                -5,
                Duration::from_millis(50),
            )
            .await
            .unwrap();

        assert_eq!(session.dispatched()[0].end(), Some(Point::new(15, 5)));
    }

    #[tokio::test]
    async fn test_swipe_failure_propagates() {
        let session = session_with_image().with_failing_actions();
        let gestures = GestureExecutor::new(&session);
        let element = ElementHandle("img".to_string());

        let err = gestures
            .swipe(&GestureOrigin::element(&element), 0, 100, Duration::from_millis(600))
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::GestureDispatch(_)));
    }

    #[tokio::test]
    async fn test_swipe_on_detached_element_propagates() {
        let session = FakeSession::new();
        let gestures = GestureExecutor::new(&session);
        let element = ElementHandle("gone".to_string());

        let err = gestures
            .swipe(&GestureOrigin::element(&element), 0, 100, Duration::from_millis(600))
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::StaleElement(_)));
        assert!(session.dispatched().is_empty());
    }

    #[tokio::test]
    async fn test_scroll_inverts_offsets() {
        let session = session_with_image();
        let gestures = GestureExecutor::new(&session);
        let element = ElementHandle("img".to_string());

        gestures
            .scroll(&GestureOrigin::element(&element), 0, 300)
            .await;

        let seq = &session.dispatched()[0];
        assert_eq!(seq.start(), Some(Point::new(200, 250)));
        assert_eq!(seq.end(), Some(Point::new(200, -50)));
    }

    #[tokio::test]
    async fn test_scroll_failure_is_swallowed() {
        let session = session_with_image().with_failing_actions();
        let gestures = GestureExecutor::new(&session);
        let element = ElementHandle("img".to_string());

        // Returns normally even though dispatch failed
        gestures
            .scroll(&GestureOrigin::element(&element), 0, 300)
            .await;
        assert_eq!(session.dispatched().len(), 1);

        // So does a scroll whose origin cannot be resolved
        gestures
            .scroll(&GestureOrigin::element(&ElementHandle("gone".into())), 0, 300)
            .await;
    }

    #[tokio::test]
    async fn test_swipe_window_bottom_to_top() {
        let session = FakeSession::new();
        let gestures = GestureExecutor::new(&session);

        gestures
            .swipe_window(0.95, 0.05, Duration::from_millis(100))
            .await
            .unwrap();

        let calls = session.calls();
        let seq = match calls.last() {
            Some(Call::Actions(seq)) => seq,
            other => panic!("expected an action dispatch, got {other:?}"),
        };
        assert_eq!(seq.start(), Some(Point::new(640, 760)));
        assert_eq!(seq.end(), Some(Point::new(640, 40)));
    }
}
