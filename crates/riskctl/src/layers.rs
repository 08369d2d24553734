use crate::output::{colored, to_table_row, CliOutput};
use crate::CliContext;
use risk_monitor::{infrastructure::Route, layers::LayerAttempt};

#[derive(Debug, clap::Args)]
pub struct Layers;

#[derive(Debug, clap::Args)]
pub struct Routes;

impl Layers {
    pub async fn run(&self, ctx: &mut CliContext) -> anyhow::Result<()> {
        let client = ctx.client()?;
        let attempts =
            risk_monitor::layers::fetch_all(&client, &ctx.config().districts).await;

        ctx.write_all(attempts)
    }
}

impl Routes {
    pub async fn run(&self, ctx: &mut CliContext) -> anyhow::Result<()> {
        let routes = ctx.config().routes().await?;
        ctx.write_all(routes)
    }
}

impl CliOutput for LayerAttempt {
    type CellValue = String;

    fn table_headers() -> Vec<&'static str> {
        vec!["Layer", "Status", "Tile URL / Reason"]
    }

    fn into_table_row(self) -> Vec<Self::CellValue> {
        match self {
            LayerAttempt::Available { kind, tile_url } => {
                vec![kind.to_string(), "available".to_string(), tile_url]
            }
            LayerAttempt::Unavailable { kind, reason } => {
                vec![kind.to_string(), "unavailable".to_string(), reason]
            }
        }
    }
}

impl CliOutput for Route {
    type CellValue = comfy_table::Cell;

    fn table_headers() -> Vec<&'static str> {
        vec!["Name", "Type", "Exposure", "Color", "Points"]
    }

    fn into_table_row(self) -> Vec<Self::CellValue> {
        let (color, points) = (self.style.color, self.path.len());

        let mut row: Vec<comfy_table::Cell> =
            to_table_row(&self, &["/name", "/route_type", "/exposure"])
                .into_iter()
                .map(Into::into)
                .collect();
        row.push(colored(comfy_table::Cell::new(color), color));
        row.push(comfy_table::Cell::new(points));
        row
    }
}
