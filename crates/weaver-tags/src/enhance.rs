//! Post-insertion enhancement: binding click behavior to generated elements.
//!
//! # How it works
//!
//! 1. After a rewrite, the content processor calls [`enhance_elements`] once
//!    per processor that declares an [`Enhancement`]
//! 2. Every trigger element in the container is handed to
//!    [`ContentHost::bind_click`], which skips nodes it already bound
//! 3. When the click fires, the host calls [`run_click_action`] for the bound
//!    element
//!
//! Step 2 has to be idempotent: a second listener on a toggle would cancel
//! the first one out. The bound state lives on the node object, never in its
//! markup, so an element rebuilt from serialized HTML is bound afresh.

use crate::host::ContentHost;
use crate::processor::{ClickAction, Enhancement};
use crate::host::Selector;

/// Bind `enhancement` to every unbound trigger element inside `container`.
///
/// Returns the number of newly bound elements.
pub fn enhance_elements<H: ContentHost>(
    host: &mut H,
    container: &H::Node,
    enhancement: &Enhancement,
) -> Result<usize, H::Error> {
    let trigger = Selector::class(&enhancement.trigger);
    let mut bound = 0;

    for element in host.query_all(container, &trigger) {
        if host.bind_click(&element, enhancement.clone())? {
            bound += 1;
        }
    }

    if bound > 0 {
        tracing::debug!(trigger = %enhancement.trigger, bound, "bound click handlers");
    }
    Ok(bound)
}

/// Run the click action for `target`, a previously bound trigger element.
///
/// Returns `false` when the scope or a target element is missing; that is
/// skipped silently, matching how generated markup is allowed to degrade.
pub fn run_click_action<H: ContentHost>(
    host: &mut H,
    target: &H::Node,
    enhancement: &Enhancement,
) -> Result<bool, H::Error> {
    let Some(scope) = host.closest(target, &Selector::class(&enhancement.scope)) else {
        tracing::trace!(scope = %enhancement.scope, "click target outside scope");
        return Ok(false);
    };

    match &enhancement.action {
        ClickAction::ToggleChecked => {
            let Some(input) = host.query_first(&scope, &Selector::tag("input")) else {
                return Ok(false);
            };
            let checked = host.toggle_checked(&input)?;
            tracing::trace!(checked, "toggled input");
        }
        ClickAction::ToggleClass { targets, class } => {
            let mut found = Vec::with_capacity(targets.len());
            for target_class in targets {
                match host.query_first(&scope, &Selector::class(target_class)) {
                    Some(element) => found.push(element),
                    None => return Ok(false),
                }
            }
            for element in &found {
                host.toggle_class(element, class)?;
            }
        }
    }

    Ok(true)
}
