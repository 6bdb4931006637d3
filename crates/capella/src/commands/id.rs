use anyhow::Context;
use capella_cloud::ResourceKind;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum IdCommand {
    /// Build a composite ID from name=value pairs, in the order given
    Encode {
        #[arg(required = true, value_name = "NAME=VALUE")]
        fields: Vec<String>,
    },
    /// Split a composite ID into its fields
    Decode {
        id: String,
        /// Expect the fields of this resource kind
        #[arg(long, conflicts_with = "fields")]
        kind: Option<String>,
        /// Expect exactly these fields (comma separated)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
}

pub fn handle(command: IdCommand) -> anyhow::Result<()> {
    match command {
        IdCommand::Encode { fields } => {
            let pairs = fields
                .iter()
                .map(|field| {
                    field
                        .split_once('=')
                        .with_context(|| format!("'{}' is not of the form name=value", field))
                })
                .collect::<anyhow::Result<Vec<(&str, &str)>>>()?;

            println!("{}", capella_cloud::encode(&pairs)?);
        }
        IdCommand::Decode { id, kind, fields } => {
            let expected: Vec<&str> = match &kind {
                Some(kind) => kind.parse::<ResourceKind>()?.id_fields().to_vec(),
                None if !fields.is_empty() => fields.iter().map(String::as_str).collect(),
                None => anyhow::bail!("pass --kind or --fields to say which fields to expect"),
            };

            let decoded = capella_cloud::decode(&id, &expected)?;
            for (name, value) in decoded.fields() {
                println!("{}={}", name, value);
            }
        }
    }
    Ok(())
}
