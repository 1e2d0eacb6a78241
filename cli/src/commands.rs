//! `petition` subcommands.
//!
//! - `petition submit <form.toml>` - validate, submit and download
//! - `petition totals <form.toml>` - print the recomputed totals
//! - `petition cnpj <id>` - look a company up

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use petition_form::FormState;
use petition_form::Totals;

use crate::client::DEFAULT_SERVER_URL;
use crate::client::Format;
use crate::client::PetitionClient;
use crate::form_file::FormFile;
use crate::naming::download_filename;

/// Petition generator client
#[derive(Debug, Parser)]
#[command(name = "petition", version)]
pub struct PetitionCli {
    #[command(subcommand)]
    pub command: PetitionSubcommand,
}

impl PetitionCli {
    pub async fn run(self) -> i32 {
        let result = match self.command {
            PetitionSubcommand::Submit(args) => run_submit(args).await,
            PetitionSubcommand::Totals(args) => run_totals(args).await,
            PetitionSubcommand::Cnpj(args) => run_cnpj(args).await,
        };
        match result {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("erro: {err:#}");
                1
            }
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum PetitionSubcommand {
    /// Validate a form file, generate the petition and download it
    Submit(SubmitArgs),

    /// Print the totals a form file adds up to
    Totals(TotalsArgs),

    /// Look a company up by CNPJ
    Cnpj(CnpjArgs),
}

#[derive(Debug, Parser)]
pub struct SubmitArgs {
    /// Form file (TOML)
    pub form: PathBuf,

    /// Artifacts to produce
    #[arg(long, value_enum, default_value = "both")]
    pub format: Format,

    /// Use the `{tipo, dados}` endpoints that return the document bytes
    #[arg(long)]
    pub legacy: bool,

    /// Server base URL
    #[arg(long, env = "PETITION_SERVER", default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// Directory the artifacts are saved to
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

#[derive(Debug, Parser)]
pub struct TotalsArgs {
    /// Form file (TOML)
    pub form: PathBuf,
}

#[derive(Debug, Parser)]
pub struct CnpjArgs {
    /// CNPJ, with or without punctuation
    pub id: String,

    /// Server base URL
    #[arg(long, env = "PETITION_SERVER", default_value = DEFAULT_SERVER_URL)]
    pub server: String,
}

async fn load_state(path: &Path) -> anyhow::Result<FormState> {
    let file = FormFile::load(path).await?;
    Ok(file.replay()?)
}

fn print_totals(totals: &Totals) {
    let [paid, doubled, claim] = totals.display();
    println!("Valor pago indevidamente: {paid}");
    println!("Valor em dobro:           {doubled}");
    println!("Valor da causa:           {claim}");
}

pub async fn run_totals(args: TotalsArgs) -> anyhow::Result<()> {
    let state = load_state(&args.form).await?;
    print_totals(&state.totals());
    Ok(())
}

pub async fn run_submit(args: SubmitArgs) -> anyhow::Result<()> {
    let written = submit(&args).await?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

/// Validate, generate and save. Returns the paths written.
pub async fn submit(args: &SubmitArgs) -> anyhow::Result<Vec<PathBuf>> {
    let mut state = load_state(&args.form).await?;
    // Refused submissions never reach the server.
    let (kind, payload) = state.submit()?;
    print_totals(&payload.totals);

    let client = PetitionClient::new(args.server.as_str());
    let name = |ext: &str| {
        download_filename(
            kind,
            &payload.form.claimant.full_name,
            &payload.form.respondent.company_name,
            ext,
        )
    };
    tokio::fs::create_dir_all(&args.out)
        .await
        .with_context(|| format!("creating {}", args.out.display()))?;

    let mut written = Vec::new();
    if args.legacy {
        let bytes = client.produce_legacy(kind, &payload, args.format).await?;
        written.push(save(&args.out, &name(args.format.legacy_extension()), &bytes).await?);
    } else {
        let urls = client.publish(kind, &payload, args.format).await?;
        for (url, ext) in [(urls.docx_url, "docx"), (urls.pdf_url, "pdf")] {
            let Some(url) = url else {
                continue;
            };
            let bytes = client.download(&url).await?;
            written.push(save(&args.out, &name(ext), &bytes).await?);
        }
    }
    state.confirm_generated();
    if let Some(alert) = state.take_alert() {
        eprintln!("{}", alert.message);
    }
    tracing::info!(files = written.len(), "artifacts saved");
    Ok(written)
}

async fn save(dir: &Path, name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

pub async fn run_cnpj(args: CnpjArgs) -> anyhow::Result<()> {
    let outcome = PetitionClient::new(args.server).lookup_cnpj(&args.id).await?;
    let record = outcome.data;
    println!("Fonte:    {}", outcome.source);
    println!("Nome:     {}", record.name);
    println!("CNPJ:     {}", record.cnpj);
    println!("Endereço: {}", record.address);
    println!("E-mail:   {}", record.email);
    println!("WhatsApp: {}", record.phone);
    Ok(())
}
