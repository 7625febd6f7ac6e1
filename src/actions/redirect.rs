//! Client redirects.

use axum::http::{header, StatusCode};

use crate::actions::Signal;
use crate::conditions::ConditionSet;
use crate::engine::context::RewriteContext;
use crate::engine::template::Template;

/// Redirects the client to a templated target.
#[derive(Debug, Clone)]
pub struct Redirect {
    conditions: ConditionSet,
    target: Template,
    permanent: bool,
}

impl Redirect {
    pub fn new(target: Template, permanent: bool) -> Self {
        Self {
            conditions: ConditionSet::default(),
            target,
            permanent,
        }
    }

    pub fn with_conditions(mut self, conditions: ConditionSet) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn conditions(&self) -> &ConditionSet {
        &self.conditions
    }

    pub fn target(&self) -> &Template {
        &self.target
    }

    pub fn is_permanent(&self) -> bool {
        self.permanent
    }

    pub fn status(&self) -> StatusCode {
        if self.permanent {
            StatusCode::MOVED_PERMANENTLY
        } else {
            StatusCode::FOUND
        }
    }

    pub fn execute(&self, ctx: &mut RewriteContext) -> Signal {
        if !self.conditions.evaluate(ctx) {
            return Signal::Continue;
        }

        let location = escape_location(self.target.expand(ctx));
        ctx.set_status(self.status());
        ctx.set_response_header(header::LOCATION.as_str(), location);
        Signal::Done
    }
}

/// Percent-encode whitespace, control and non-ASCII characters so the target
/// stays a valid `Location` value.
fn escape_location(target: String) -> String {
    if target.bytes().all(|b| b.is_ascii_graphic()) {
        return target;
    }

    let mut escaped = String::with_capacity(target.len());
    let mut buf = [0u8; 4];
    for ch in target.chars() {
        if ch.is_ascii_graphic() {
            escaped.push(ch);
        } else {
            escaped.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::Condition;
    use crate::transforms::{Transform, TransformTable};
    use axum::http::Method;

    fn redirect(to: &str, permanent: bool) -> Redirect {
        Redirect::new(Template::compile(to, &TransformTable::new()).unwrap(), permanent)
            .with_conditions(ConditionSet::new(false).with(Condition::url("^/old/(.*)$").unwrap()))
    }

    #[test]
    fn test_permanent_redirect() {
        let mut ctx = RewriteContext::new(Method::GET, "/old/page");
        assert_eq!(redirect("/new/$1", true).execute(&mut ctx), Signal::Done);
        assert_eq!(ctx.status(), Some(StatusCode::MOVED_PERMANENTLY));
        assert_eq!(ctx.response_header("location"), Some("/new/page"));
    }

    #[test]
    fn test_temporary_redirect() {
        let mut ctx = RewriteContext::new(Method::GET, "/old/page");
        assert_eq!(redirect("/new/$1", false).execute(&mut ctx), Signal::Done);
        assert_eq!(ctx.status(), Some(StatusCode::FOUND));
    }

    #[test]
    fn test_unmatched_has_no_side_effects() {
        let mut ctx = RewriteContext::new(Method::GET, "/other");
        assert_eq!(redirect("/new/$1", true).execute(&mut ctx), Signal::Continue);
        assert_eq!(ctx.status(), None);
        assert!(ctx.response_headers().is_empty());
        assert_eq!(ctx.location(), "/other");
    }

    #[test]
    fn test_target_is_escaped_for_location() {
        let mut transforms = TransformTable::new();
        transforms.insert(Transform::UrlDecode);
        let action = Redirect::new(
            Template::compile("/x/${decode($1)}", &transforms).unwrap(),
            true,
        )
        .with_conditions(ConditionSet::new(false).with(Condition::url("^/r/(.*)$").unwrap()));

        let mut ctx = RewriteContext::new(Method::GET, "/r/a%0Ab%20c%C3%A9");
        assert_eq!(action.execute(&mut ctx), Signal::Done);
        assert_eq!(ctx.response_header("location"), Some("/x/a%0Ab%20c%C3%A9"));
    }
}
