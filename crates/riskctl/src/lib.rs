use clap::Parser;

mod alerts;
mod config;
mod layers;
mod output;
mod render;
mod watch;

use output::{Output, OutputType};

/// A command-line tool for monitoring landslide risk alerts.
#[derive(Debug, Parser)]
#[clap(author, about, version)]
pub struct Cli {
    #[clap(subcommand)]
    cmd: Command,

    #[clap(flatten)]
    config: config::Config,

    #[clap(flatten)]
    output: Output,

    /// Write logs as JSON, rather than as text.
    #[clap(long = "log-json", env = "RISKCTL_LOG_JSON", global = true)]
    pub log_json: bool,
}

#[derive(Debug, clap::Subcommand)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Load the historical snapshot of alerts, in priority order.
    History(alerts::History),
    /// Take a single poll of the live simulation feed, in priority order.
    Simulate(alerts::Simulate),
    /// Print the detailed analysis of one alert.
    ///
    /// Alerts are loaded once, from the historical snapshot or from a
    /// simulation poll, and the alert having the given id is selected.
    Detail(alerts::Detail),
    /// Fetch every map layer, and report which are available.
    Layers(layers::Layers),
    /// Print the critical infrastructure routes and their styling.
    Routes(layers::Routes),
    /// Continuously monitor alerts.
    ///
    /// Watch re-draws the dashboard whenever alerts, map layers, or the
    /// selection change. It reads commands from stdin, one per line:
    ///   t       toggle between historical and simulation modes
    ///   s <id>  select the alert having <id>
    ///   c       clear the selection
    ///   q       quit
    /// Watch also exits upon CTRL-C, or when stdin is closed.
    #[clap(verbatim_doc_comment)]
    Watch(watch::Watch),
}

#[derive(Debug)]
pub struct CliContext {
    config: config::Config,
    output: Output,
    client: Option<risk_client::Client>,
}

impl CliContext {
    /// Returns a client of the risk API, creating a new one if necessary.
    pub fn client(&mut self) -> anyhow::Result<risk_client::Client> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = self.config.client()?;
        self.client = Some(client.clone());
        Ok(client)
    }

    pub fn config(&self) -> &config::Config {
        &self.config
    }

    pub fn write_all<I, T>(&mut self, items: I) -> anyhow::Result<()>
    where
        T: output::CliOutput,
        I: IntoIterator<Item = T>,
    {
        match self.get_output_type() {
            OutputType::Json => output::print_json(items),
            OutputType::Yaml => output::print_yaml(items),
            OutputType::Table => output::print_table(items),
        }
    }

    pub fn get_output_type(&self) -> OutputType {
        use crossterm::tty::IsTty;

        if let Some(ty) = self.output.output {
            ty
        } else if std::io::stdout().is_tty() {
            OutputType::Table
        } else {
            OutputType::Yaml
        }
    }
}

impl Cli {
    pub async fn run(&self) -> anyhow::Result<()> {
        tracing::debug!(config = %serde_json::to_string(&self.config)?, "resolved configuration");

        let mut context = CliContext {
            config: self.config.clone(),
            output: self.output.clone(),
            client: None,
        };

        match &self.cmd {
            Command::History(history) => history.run(&mut context).await,
            Command::Simulate(simulate) => simulate.run(&mut context).await,
            Command::Detail(detail) => detail.run(&mut context).await,
            Command::Layers(layers) => layers.run(&mut context).await,
            Command::Routes(routes) => routes.run(&mut context).await,
            Command::Watch(watch) => watch.run(&mut context).await,
        }
    }
}

// new_table builds a comfy_table with UTF8 styling.
fn new_table(headers: Vec<&str>) -> comfy_table::Table {
    let mut table = comfy_table::Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .apply_modifier(comfy_table::modifiers::UTF8_SOLID_INNER_BORDERS);

    table.set_header(headers);
    table
}
