use super::comment::Comment;
use crate::types::post_id::PostId;

pub const EDIT_COMMENT: &str = "EDIT_COMMENT";

/// Three-valued outcome: a voter that does not recognize the action/subject
/// pair abstains instead of denying, so the caller can tell "does not
/// apply" from "refused".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permit,
    Deny,
    Abstain,
}

/// The security context the host framework resolved for the request.
/// `user_id` is `None` for unauthenticated callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actor {
    pub user_id: Option<i64>,
}

impl Actor {
    pub fn user(id: i64) -> Self {
        Self { user_id: Some(id) }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Comment(&'a Comment),
    Post(PostId),
}

pub trait Voter {
    fn vote(&self, actor: &Actor, action: &str, subject: &Subject<'_>) -> Decision;
}

/// Permits editing a comment only to its author. Pure: reads nothing beyond
/// the two identifiers.
pub struct CommentVoter;

impl Voter for CommentVoter {
    fn vote(&self, actor: &Actor, action: &str, subject: &Subject<'_>) -> Decision {
        let Subject::Comment(comment) = subject else {
            return Decision::Abstain;
        };
        if action != EDIT_COMMENT {
            return Decision::Abstain;
        }
        match actor.user_id {
            Some(id) if id == comment.author.id => Decision::Permit,
            _ => Decision::Deny,
        }
    }
}

/// Folds a voter chain: the first voter that does not abstain decides.
/// All-abstain is reported as such; mapping it to deny is the caller's
/// default, applied in `is_granted`.
pub fn decide(voters: &[&dyn Voter], actor: &Actor, action: &str, subject: &Subject<'_>) -> Decision {
    for voter in voters {
        match voter.vote(actor, action, subject) {
            Decision::Abstain => continue,
            decision => return decision,
        }
    }
    Decision::Abstain
}

pub fn is_granted(voters: &[&dyn Voter], actor: &Actor, action: &str, subject: &Subject<'_>) -> bool {
    matches!(decide(voters, actor, action, subject), Decision::Permit)
}
