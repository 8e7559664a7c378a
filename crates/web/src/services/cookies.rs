// =============================================================================
// Consent Banner Web - document.cookie Jar
// =============================================================================

use consent_banner_core::{ConsentError, ConsentResult, CookieJar};
use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentCookieJar;

impl DocumentCookieJar {
    fn document() -> ConsentResult<HtmlDocument> {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.dyn_into::<HtmlDocument>().ok())
            .ok_or_else(|| ConsentError::MissingDependency("document".to_string()))
    }
}

impl CookieJar for DocumentCookieJar {
    fn cookie_header(&self) -> ConsentResult<String> {
        Self::document()?
            .cookie()
            .map_err(|e| ConsentError::Storage(format!("document.cookie: {:?}", e)))
    }

    fn set_cookie(&self, assignment: &str) -> ConsentResult<()> {
        Self::document()?
            .set_cookie(assignment)
            .map_err(|e| ConsentError::Storage(format!("document.cookie: {:?}", e)))
    }
}
