//! Parameter checks that run before any network activity.

use crate::action::{Action, ActionKind, ActionRequest, ClickButton, Coordinate, WaitDuration};
use crate::error::ValidationError;
use crate::scroll::{ScrollOptions, MAX_FOCUS_TABS};
use serde_json::Value;

/// Validate a request and produce its typed form.
///
/// Pure: no I/O, no clock. A request that passes here is dispatched as-is.
pub fn validate(request: &ActionRequest) -> Result<Action, ValidationError> {
    let kind = request.action;

    match kind {
        ActionKind::Key | ActionKind::Type => {
            let text = match &request.text {
                None => return Err(ValidationError::new(format!("text is required for {}", kind))),
                Some(text) => text,
            };
            if request.coordinate.is_some() {
                return Err(ValidationError::new(format!(
                    "coordinate is not accepted for {}",
                    kind
                )));
            }
            let text = string_value(text)?;
            Ok(if kind == ActionKind::Key {
                Action::Key { text }
            } else {
                Action::Type { text }
            })
        }

        ActionKind::MouseMove | ActionKind::LeftClickDrag => {
            let coordinate = match &request.coordinate {
                None => {
                    return Err(ValidationError::new(format!(
                        "coordinate is required for {}",
                        kind
                    )))
                }
                Some(coordinate) => coordinate,
            };
            if request.text.is_some() {
                return Err(ValidationError::new(format!("text is not accepted for {}", kind)));
            }
            let to = parse_coordinate(coordinate)?;
            Ok(if kind == ActionKind::MouseMove {
                Action::MouseMove { to }
            } else {
                Action::LeftClickDrag { to }
            })
        }

        ActionKind::LeftClick
        | ActionKind::RightClick
        | ActionKind::MiddleClick
        | ActionKind::DoubleClick => {
            let button = match kind {
                ActionKind::LeftClick => ClickButton::Left,
                ActionKind::RightClick => ClickButton::Right,
                ActionKind::MiddleClick => ClickButton::Middle,
                _ => ClickButton::Double,
            };
            let at = request.coordinate.as_ref().map(parse_coordinate).transpose()?;
            let modifiers = request.text.as_ref().map(string_value).transpose()?;
            Ok(Action::Click {
                button,
                at,
                modifiers,
            })
        }

        ActionKind::Scroll => {
            let options = scroll_options(request)?;
            let at = request.coordinate.as_ref().map(parse_coordinate).transpose()?;
            Ok(Action::Scroll { options, at })
        }

        ActionKind::Wait => Ok(Action::Wait {
            duration: wait_duration(request)?,
        }),

        ActionKind::Screenshot => Ok(Action::Screenshot),
        ActionKind::CursorPosition => Ok(Action::CursorPosition),
    }
}

fn string_value(value: &Value) -> Result<String, ValidationError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ValidationError::new("text must be a string"))
}

fn parse_coordinate(value: &Value) -> Result<Coordinate, ValidationError> {
    let invalid = || {
        ValidationError::new(format!(
            "coordinate must be a pair of non-negative integers, got {}",
            value
        ))
    };

    let pair = value.as_array().filter(|items| items.len() == 2).ok_or_else(invalid)?;
    let component = |item: &Value| {
        item.as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(invalid)
    };

    Ok(Coordinate::new(component(&pair[0])?, component(&pair[1])?))
}

/// Look up an option by name or alias; JSON null counts as absent.
fn option<'a>(request: &'a ActionRequest, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| request.option(name))
        .find(|value| !value.is_null())
}

fn string_option<T>(request: &ActionRequest, names: &[&str], message: &str) -> Result<Option<T>, ValidationError>
where
    T: std::str::FromStr<Err = ValidationError>,
{
    match option(request, names) {
        None => Ok(None),
        Some(Value::String(s)) => s.parse().map(Some),
        Some(_) => Err(ValidationError::new(message)),
    }
}

fn bool_option(request: &ActionRequest, name: &str, default: bool) -> Result<bool, ValidationError> {
    match option(request, &[name]) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(ValidationError::new(format!("{} must be a boolean", name))),
    }
}

fn scroll_options(request: &ActionRequest) -> Result<ScrollOptions, ValidationError> {
    let defaults = ScrollOptions::default();

    let direction = string_option(
        request,
        &["scroll_direction", "direction"],
        "scroll_direction must be 'down' or 'up'",
    )?
    .unwrap_or(defaults.direction);

    let amount = match option(request, &["scroll_amount", "amount"]) {
        None => defaults.amount,
        Some(value) => {
            let amount = value
                .as_u64()
                .filter(|n| *n > 0)
                .ok_or_else(|| ValidationError::new("scroll_amount must be a positive integer"))?;
            u32::try_from(amount).map_err(|_| {
                ValidationError::new(format!(
                    "scroll_amount must be at most {}, got {}",
                    u32::MAX,
                    amount
                ))
            })?
        }
    };

    let granularity = string_option(
        request,
        &["granularity"],
        "granularity must be 'line' or 'page'",
    )?
    .unwrap_or(defaults.granularity);

    let focus_target = string_option(
        request,
        &["focus_target"],
        "focus_target must be 'gutter' or 'coordinate'",
    )?
    .unwrap_or(defaults.focus_target);

    let focus_strategy = string_option(
        request,
        &["focus_strategy"],
        "focus_strategy must be one of 'none', 'escape', 'tab', 'escape_tab'",
    )?
    .unwrap_or(defaults.focus_strategy);

    let focus_tab_count = match option(request, &["focus_tab_count"]) {
        None => defaults.focus_tab_count,
        Some(value) => {
            let count = value
                .as_i64()
                .ok_or_else(|| ValidationError::new("focus_tab_count must be an integer"))?;
            count.clamp(0, i64::from(MAX_FOCUS_TABS)) as u32
        }
    };

    Ok(ScrollOptions {
        direction,
        amount,
        granularity,
        click_to_focus: bool_option(request, "click_to_focus", defaults.click_to_focus)?,
        focus_target,
        focus_strategy,
        focus_tab_count,
        jump_to_boundary: bool_option(request, "jump_to_boundary", defaults.jump_to_boundary)?,
        move_pointer: bool_option(request, "move_pointer", defaults.move_pointer)?,
    })
}

fn wait_duration(request: &ActionRequest) -> Result<WaitDuration, ValidationError> {
    let invalid = || ValidationError::new("duration must be a non-negative number for wait");

    match option(request, &["duration"]) {
        None => Ok(WaitDuration::default()),
        Some(Value::Number(number)) => {
            let seconds = number.as_f64().filter(|s| s.is_finite() && *s >= 0.0).ok_or_else(invalid)?;
            Ok(WaitDuration::new(seconds, number.to_string()))
        }
        Some(_) => Err(invalid()),
    }
}
