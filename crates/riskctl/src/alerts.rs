use crate::output::{colored, CliOutput, OutputType};
use crate::{output, render, CliContext};
use risk_models::{Alert, AlertId};
use risk_monitor::{controller, view, AlertStore};

#[derive(Debug, clap::Args)]
pub struct History;

#[derive(Debug, clap::Args)]
pub struct Simulate;

#[derive(Debug, clap::Args)]
pub struct Detail {
    /// Id of the alert to detail.
    id: AlertId,
    /// Load alerts from a simulation poll, rather than the historical snapshot.
    #[clap(long)]
    simulation: bool,
}

impl History {
    pub async fn run(&self, ctx: &mut CliContext) -> anyhow::Result<()> {
        let alerts = load(ctx, false).await?;
        ctx.write_all(view::alert_list(&AlertStore::new(alerts)))
    }
}

impl Simulate {
    pub async fn run(&self, ctx: &mut CliContext) -> anyhow::Result<()> {
        let alerts = load(ctx, true).await?;
        ctx.write_all(view::alert_list(&AlertStore::new(alerts)))
    }
}

impl Detail {
    pub async fn run(&self, ctx: &mut CliContext) -> anyhow::Result<()> {
        let mut store = AlertStore::new(load(ctx, self.simulation).await?);

        if store.select(&self.id).is_none() {
            tracing::warn!(id = %self.id, "no alert has this id");
        }
        let panel = view::detail_panel(&store);

        match ctx.get_output_type() {
            OutputType::Json => output::print_json([panel]),
            OutputType::Yaml => output::print_yaml([panel]),
            OutputType::Table => {
                print!("{}", render::detail(&panel));
                Ok(())
            }
        }
    }
}

// Load alerts once, as a single historical snapshot or simulation poll.
async fn load(ctx: &mut CliContext, simulation: bool) -> anyhow::Result<Vec<Alert>> {
    let client = ctx.client()?;

    let alerts = if simulation {
        controller::acquire_simulation(&client, 1).await?
    } else {
        controller::acquire_history(&client).await?
    };
    Ok(alerts)
}

impl CliOutput for view::ListEntry {
    type CellValue = comfy_table::Cell;

    fn table_headers() -> Vec<&'static str> {
        vec!["ID", "Region", "Risk", "Time"]
    }

    fn into_table_row(self) -> Vec<Self::CellValue> {
        let mut id = comfy_table::Cell::new(&self.id);
        if self.selected {
            id = id.add_attribute(comfy_table::Attribute::Bold);
        }
        vec![
            id,
            comfy_table::Cell::new(&self.region),
            colored(comfy_table::Cell::new(&self.risk), self.color),
            comfy_table::Cell::new(&self.time),
        ]
    }
}
