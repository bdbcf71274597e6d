use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use http::{
    Extensions, HeaderMap, HeaderValue, Method, Uri, Version,
    header::{AsHeaderName, IntoHeaderName},
    request::Parts,
};

/// Direct access to the response being written for the current request.
///
/// Headers set here are applied after `Content-Type: application/json`, so a
/// handler may override it. Headers set after the handler returned are
/// discarded.
#[derive(Clone, Debug, Default)]
pub struct ResponseSink(Arc<Mutex<HeaderMap>>);

impl ResponseSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }
    fn lock(&self) -> MutexGuard<'_, HeaderMap> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_header<K: IntoHeaderName>(
        &self,
        name: K,
        value: HeaderValue,
    ) -> Option<HeaderValue> {
        self.lock().insert(name, value)
    }
    pub fn append_header<K: IntoHeaderName>(&self, name: K, value: HeaderValue) -> bool {
        self.lock().append(name, value)
    }
    pub fn remove_header<K: AsHeaderName>(&self, name: K) -> Option<HeaderValue> {
        self.lock().remove(name)
    }
    /// Snapshot of the headers set so far.
    pub fn headers(&self) -> HeaderMap {
        self.lock().clone()
    }

    pub(crate) fn take_headers(&self) -> HeaderMap {
        std::mem::take(&mut *self.lock())
    }
}

/// The incoming request, without its body.
#[derive(Clone, Debug)]
pub struct RequestContext(Arc<Parts>);

impl RequestContext {
    pub(crate) fn new(parts: Parts) -> Self {
        Self(Arc::new(parts))
    }

    pub fn method(&self) -> &Method {
        &self.0.method
    }
    pub fn uri(&self) -> &Uri {
        &self.0.uri
    }
    pub fn version(&self) -> Version {
        self.0.version
    }
    pub fn headers(&self) -> &HeaderMap {
        &self.0.headers
    }
    pub fn extensions(&self) -> &Extensions {
        &self.0.extensions
    }
    pub fn parts(&self) -> &Parts {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use http::{Request, header::CONTENT_TYPE};

    use super::*;

    #[test]
    fn sink_headers_are_shared_between_clones() {
        let sink = ResponseSink::new();
        let clone = sink.clone();
        clone.insert_header("x-trace", HeaderValue::from_static("1"));
        clone.append_header("x-trace", HeaderValue::from_static("2"));
        assert_eq!(sink.headers().get_all("x-trace").iter().count(), 2);
    }

    #[test]
    fn take_headers_empties_sink() {
        let sink = ResponseSink::new();
        sink.insert_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert_eq!(sink.take_headers().len(), 1);
        assert!(sink.headers().is_empty());
        assert_eq!(sink.remove_header(CONTENT_TYPE), None);
    }

    #[test]
    fn context_exposes_request_parts() {
        let (parts, ()) = Request::builder()
            .method(Method::PUT)
            .uri("/items/7?x=1")
            .header("x-user", "alice")
            .extension(42u32)
            .body(())
            .unwrap()
            .into_parts();
        let cx = RequestContext::new(parts);
        assert_eq!(cx.method(), Method::PUT);
        assert_eq!(cx.uri().path(), "/items/7");
        assert_eq!(cx.uri().query(), Some("x=1"));
        assert_eq!(cx.headers()["x-user"], "alice");
        assert_eq!(cx.extensions().get::<u32>(), Some(&42));
        assert_eq!(cx.version(), Version::HTTP_11);
        assert_eq!(cx.parts().method, Method::PUT);
    }
}
