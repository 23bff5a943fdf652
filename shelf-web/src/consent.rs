use crate::session::{Activation, BrowsingSession, SessionError, Wait};
use shelf_config::ConsentConfig;
use tracing::{debug, info};

/// Click the cookie-consent banner once if it shows up within the timeout.
///
/// Returns whether the banner was dismissed. A missing or unclickable
/// banner is not an error.
pub async fn accept_cookies<S>(session: &S, config: &ConsentConfig) -> Result<bool, SessionError>
where
    S: BrowsingSession + ?Sized,
{
    let button = match session
        .wait_for_presence(&config.selector, config.timeout())
        .await?
    {
        Wait::Ready(button) => button,
        Wait::TimedOut => {
            debug!(target: "shelf.consent", selector = %config.selector, "no consent banner");
            return Ok(false);
        }
    };

    match session.activate(&button).await? {
        Activation::Activated => {
            info!(target: "shelf.consent", "consent banner dismissed");
            Ok(true)
        }
        Activation::Rejected(reason) => {
            debug!(target: "shelf.consent", %reason, "consent banner ignored the click");
            Ok(false)
        }
    }
}
