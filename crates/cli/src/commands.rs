use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one page of a CSV file in keyset order
    Page {
        #[arg(long, help = "CSV file to scroll through")]
        file: PathBuf,

        #[arg(long, help = "Entity name; defaults to the file stem")]
        entity: Option<String>,

        #[arg(long, help = "Sort key as `field:asc` or `field:desc`")]
        sort: Option<String>,

        #[arg(long, help = "Page size")]
        limit: Option<u64>,

        #[arg(long, help = "Cursor token returned by a previous call")]
        cursor: Option<String>,

        #[arg(long, help = "Treat a plain token as a previous cursor")]
        previous: bool,

        #[arg(long, help = "Token encoding: plain or base64")]
        encoding: Option<String>,

        #[arg(long, help = "Comparison type of the sort field, overriding inference")]
        field_type: Option<String>,

        #[arg(long, help = "Scroll settings file (JSON)")]
        config: Option<PathBuf>,

        #[arg(
            long,
            help = "Print the prepared query for this SQL dialect (postgres, mysql) instead of fetching"
        )]
        sql: Option<String>,
    },
    /// Build a cursor token from its parts
    Encode {
        #[arg(long)]
        field: String,

        #[arg(long, default_value = "string")]
        field_type: String,

        #[arg(long, default_value = "asc")]
        direction: String,

        /// Sort value; omitted for a null value
        #[arg(long)]
        value: Option<String>,

        #[arg(long)]
        id: String,

        #[arg(long, default_value = "int")]
        id_type: String,

        #[arg(long)]
        previous: bool,

        #[arg(long, default_value = "plain")]
        encoding: String,
    },
    /// Print the cursor a token stands for, as JSON
    Decode {
        #[arg(long)]
        token: String,

        #[arg(long, default_value = "plain")]
        encoding: String,

        #[arg(long, default_value = "field", help = "Sort field (plain tokens only)")]
        field: String,

        #[arg(long, default_value = "string")]
        field_type: String,

        #[arg(long, default_value = "asc")]
        direction: String,

        #[arg(long, default_value = "int")]
        id_type: String,

        #[arg(long, help = "Treat a plain token as a previous cursor")]
        previous: bool,
    },
}
