//! Fixed status responses.

use axum::http::StatusCode;

use crate::actions::Signal;
use crate::engine::context::RewriteContext;

/// Sets the response status and ends processing of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetStatus {
    status: StatusCode,
}

impl SetStatus {
    pub fn new(status: StatusCode) -> Self {
        Self { status }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN)
    }

    pub fn gone() -> Self {
        Self::new(StatusCode::GONE)
    }

    pub fn not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn not_implemented() -> Self {
        Self::new(StatusCode::NOT_IMPLEMENTED)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn execute(&self, ctx: &mut RewriteContext) -> Signal {
        ctx.set_status(self.status);
        Signal::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn test_not_found_is_terminal() {
        let mut ctx = RewriteContext::new(Method::GET, "/secret");
        assert_eq!(SetStatus::not_found().execute(&mut ctx), Signal::Done);
        assert_eq!(ctx.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_shorthands() {
        assert_eq!(SetStatus::forbidden().status().as_u16(), 403);
        assert_eq!(SetStatus::gone().status().as_u16(), 410);
        assert_eq!(SetStatus::not_allowed().status().as_u16(), 405);
        assert_eq!(SetStatus::not_implemented().status().as_u16(), 501);
    }
}
