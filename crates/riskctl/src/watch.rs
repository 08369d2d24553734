use crate::{output::OutputType, render, CliContext};
use anyhow::Context;
use risk_models::AlertId;
use risk_monitor::{infrastructure::Route, view, Controller, Dashboard, Sources};
use std::io::Write;
use tokio::io::AsyncBufReadExt;

#[derive(Debug, clap::Args)]
pub struct Watch {
    /// Enter simulation mode right away, rather than starting from the historical snapshot.
    #[clap(long)]
    simulation: bool,
}

/// An operator command read from stdin.
#[derive(Debug, PartialEq)]
enum Action {
    Toggle,
    Select(AlertId),
    Clear,
    Quit,
}

impl Watch {
    pub async fn run(&self, ctx: &mut CliContext) -> anyhow::Result<()> {
        let client = ctx.client()?;
        let routes = ctx.config().routes().await?;
        let output = ctx.get_output_type();

        let mut controller = Controller::new(client, ctx.config().settings());
        let mut updates = controller.subscribe();
        controller.start();

        if self.simulation {
            controller.toggle();
        }

        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let dash = updates.borrow_and_update().clone();
        draw(&dash, &routes, output)?;

        loop {
            tokio::select! {
                result = &mut ctrl_c => {
                    result.context("listening for CTRL-C")?;
                    tracing::info!("caught CTRL-C, shutting down");
                    break;
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let dash = updates.borrow_and_update().clone();
                    draw(&dash, &routes, output)?;
                }
                line = lines.next_line() => {
                    let Some(line) = line.context("reading stdin")? else {
                        tracing::info!("stdin closed, shutting down");
                        break;
                    };
                    match parse_action(&line) {
                        Ok(Some(Action::Quit)) => break,
                        Ok(Some(action)) => apply(&mut controller, action),
                        Ok(None) => (),
                        Err(err) => eprintln!("{err}"),
                    }
                }
            }
        }

        controller.shutdown().await;
        Ok(())
    }
}

fn apply<S: Sources>(controller: &mut Controller<S>, action: Action) {
    match action {
        Action::Toggle => {
            let mode = controller.toggle();
            tracing::info!(%mode, "toggled acquisition mode");
        }
        Action::Select(id) => {
            if !controller.select(&id) {
                eprintln!("there's no alert {id}");
            }
        }
        Action::Clear => controller.clear_selection(),
        Action::Quit => (),
    }
}

fn parse_action(line: &str) -> anyhow::Result<Option<Action>> {
    let mut words = line.split_whitespace();

    let action = match (words.next(), words.next()) {
        (None, _) => return Ok(None),
        (Some("t"), None) => Action::Toggle,
        (Some("s"), Some(id)) => Action::Select(AlertId::new(id)),
        (Some("c"), None) => Action::Clear,
        (Some("q"), None) => Action::Quit,
        _ => anyhow::bail!("unrecognized command {line:?} (expected one of: t, s <id>, c, q)"),
    };

    if words.next().is_some() {
        anyhow::bail!("unrecognized command {line:?} (expected one of: t, s <id>, c, q)");
    }
    Ok(Some(action))
}

fn draw(dash: &Dashboard, routes: &[Route], output: OutputType) -> anyhow::Result<()> {
    let view = view::render(dash, routes);
    let mut stdout = std::io::stdout().lock();

    match output {
        OutputType::Json => {
            serde_json::to_writer(&mut stdout, &view)?;
            stdout.write_all(b"\n")?;
        }
        OutputType::Yaml => {
            serde_yaml::to_writer(&mut stdout, &view)?;
            stdout.write_all(b"\n")?;
        }
        OutputType::Table => {
            stdout.write_all(render::dashboard(&view).as_bytes())?;
        }
    }
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_actions() {
        let cases = [
            ("t", Some(Action::Toggle)),
            ("  s   sim-2-7 ", Some(Action::Select(AlertId::new("sim-2-7")))),
            ("s 0", Some(Action::Select(AlertId::new("0")))),
            ("c", Some(Action::Clear)),
            ("q", Some(Action::Quit)),
            ("", None),
            ("   ", None),
        ];
        for (line, expect) in cases {
            assert_eq!(parse_action(line).unwrap(), expect, "{line:?}");
        }

        for line in ["s", "x", "t now", "s 1 2", "quit"] {
            assert!(parse_action(line).is_err(), "{line:?}");
        }
    }
}
