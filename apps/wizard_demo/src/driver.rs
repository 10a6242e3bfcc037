//! Line-oriented driver: reads commands, forwards them to the wizard
//! session and renders the active page after each transition.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;
use wizard_core::{AdvanceOutcome, RetreatOutcome, WizardSession};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCommand {
    Set { field: String, value: String },
    Touch(String),
    Next,
    Back,
    Show,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    Submitted,
    Quit,
    EndOfInput,
}

pub fn parse_command(line: &str) -> Result<DriverCommand, String> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix(':') {
        let mut parts = rest.splitn(2, char::is_whitespace);
        let verb = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();
        return match (verb, arg) {
            ("next" | "n", "") => Ok(DriverCommand::Next),
            ("back" | "b", "") => Ok(DriverCommand::Back),
            ("show" | "s", "") => Ok(DriverCommand::Show),
            ("quit" | "q", "") => Ok(DriverCommand::Quit),
            ("touch", field) if !field.is_empty() => Ok(DriverCommand::Touch(field.to_string())),
            _ => Err(format!("unknown command ':{rest}'")),
        };
    }

    match line.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok(DriverCommand::Set {
            field: field.trim().to_string(),
            value: value.trim().to_string(),
        }),
        _ => Err(format!(
            "expected 'field=value' or one of :next :back :show :touch <field> :quit, got '{line}'"
        )),
    }
}

pub async fn render_page<W>(session: &WizardSession, output: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let index = session.current_index().await;
    let page = session.current_page().await?;
    let mut rendered = format!("step {}/{}", index + 1, session.page_count());
    if let Some(title) = &page.title {
        rendered.push_str(&format!(": {title}"));
    }
    rendered.push('\n');

    for field in session.page_fields().await? {
        rendered.push_str(&format!("  {} = {:?}", field.name, field.value));
        if let Some(error) = field.error {
            rendered.push_str(&format!("  ! {error}"));
        }
        rendered.push('\n');
    }

    let controls = session.controls().await;
    if controls.show_back {
        rendered.push_str("[back] ");
    }
    rendered.push_str(&format!("[{}]\n", controls.forward.label()));

    output.write_all(rendered.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}

async fn say<W>(output: &mut W, message: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(message.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}

pub async fn run<R, W>(session: &WizardSession, input: R, mut output: W) -> Result<DriverExit>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    render_page(session, &mut output).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                say(&mut output, &message).await?;
                continue;
            }
        };
        debug!(?command, "driver command");

        match command {
            DriverCommand::Set { field, value } => {
                session.handle_field_change(field, value).await?;
            }
            DriverCommand::Touch(field) => {
                session.mark_touched(field).await?;
            }
            DriverCommand::Next => match session.advance().await {
                Ok(AdvanceOutcome::Submitted) => {
                    say(&mut output, "submitted").await?;
                    return Ok(DriverExit::Submitted);
                }
                Ok(AdvanceOutcome::Advanced(_)) => render_page(session, &mut output).await?,
                Ok(AdvanceOutcome::ValidationFailed(errors)) => {
                    say(&mut output, &format!("{} field(s) need attention", errors.len())).await?;
                    render_page(session, &mut output).await?;
                }
                Err(err) if err.is_retryable() => {
                    say(&mut output, &format!("submit failed: {err}; :next retries")).await?;
                }
                Err(err) => return Err(err.into()),
            },
            DriverCommand::Back => match session.retreat().await? {
                RetreatOutcome::Retreated(_) => render_page(session, &mut output).await?,
                RetreatOutcome::AtFirstPage => say(&mut output, "already on the first step").await?,
            },
            DriverCommand::Show => render_page(session, &mut output).await?,
            DriverCommand::Quit => return Ok(DriverExit::Quit),
        }
    }

    Ok(DriverExit::EndOfInput)
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod tests;
