//! upiqr
//!
//! Command-line front end for building UPI payment links and QR codes.

mod config;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use upiqr_render::{
    download, generate, share_or_download, CommandShare, NoShare, QrFormat, QrOptions,
    QrRasterizer, ShareOutcome, ShareTarget,
};
use upiqr_uri::{
    normalize_amount, parse_uri, FieldName, FormState, PaymentFields, SUPPORTED_CURRENCIES,
};

use crate::config::ToolsConfig;

#[derive(Parser)]
#[command(name = "upiqr", about = "Generate UPI payment links and QR codes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the payment link for a form.
    Encode(EncodeArgs),
    /// Render the payment link as a QR code and save or share it.
    Generate(GenerateArgs),
    /// Apply the two-decimal display rule to an amount.
    Normalize {
        /// Amount as typed, e.g. 10.1
        amount: String,
    },
    /// Print the fields of a payment link.
    Decode(DecodeArgs),
}

/// Payment form fields. Flags override values loaded with --form.
#[derive(Args, Debug, Default)]
struct FormArgs {
    /// JSON file with form values (payeeVPA, payeeName, amount, ...).
    #[arg(long, value_name = "FILE")]
    form: Option<PathBuf>,
    /// Payee VPA (UPI ID), e.g. example@upi.
    #[arg(long = "vpa", visible_alias = "pa")]
    payee_vpa: Option<String>,
    /// Payee name.
    #[arg(long = "name")]
    payee_name: Option<String>,
    /// Fixed amount.
    #[arg(long)]
    amount: Option<String>,
    /// Currency code.
    #[arg(long)]
    currency: Option<String>,
    /// Transaction note.
    #[arg(long = "note")]
    transaction_note: Option<String>,
    /// Merchant code.
    #[arg(long)]
    merchant_code: Option<String>,
    /// Minimum amount.
    #[arg(long = "min-amount")]
    minimum_amount: Option<String>,
    /// Maximum amount.
    #[arg(long = "max-amount")]
    maximum_amount: Option<String>,
    /// Transaction reference.
    #[arg(long = "tx-ref")]
    transaction_ref: Option<String>,
    /// Merchant category code, e.g. 5411 for grocery stores.
    #[arg(long = "mcc")]
    merchant_category_code: Option<String>,
    /// Merchant city.
    #[arg(long = "city")]
    merchant_city: Option<String>,
    /// Merchant PIN code.
    #[arg(long = "pin-code")]
    merchant_pin_code: Option<String>,
    /// Set any field by name or link key, e.g. --set tn=Rent.
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    set: Vec<String>,
    /// Keep amounts exactly as typed instead of padding to two decimals.
    #[arg(long)]
    raw_amounts: bool,
}

#[derive(Args)]
struct EncodeArgs {
    #[command(flatten)]
    form: FormArgs,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    form: FormArgs,
    /// Output format: png, svg or terminal.
    #[arg(long, default_value_t = QrFormat::Png)]
    format: QrFormat,
    /// Target image width in pixels.
    #[arg(long)]
    width: Option<u32>,
    /// Quiet zone in modules.
    #[arg(long)]
    margin: Option<u32>,
    /// Dark module colour (#RRGGBB).
    #[arg(long)]
    dark: Option<String>,
    /// Light module colour (#RRGGBB).
    #[arg(long)]
    light: Option<String>,
    /// Directory the image is saved to.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Offer the saved image to the configured share command.
    #[arg(long)]
    share: bool,
    /// Also print the image as a data URI.
    #[arg(long)]
    data_uri: bool,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DecodeArgs {
    /// Payment link, e.g. upi://pay?pa=example%40upi
    uri: String,
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct GenerateSummary {
    uri: String,
    format: String,
    file: Option<String>,
    shared: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_uri: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upiqr=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = ToolsConfig::from_env()?;

    match cli.command {
        Commands::Encode(args) => encode(args, &config),
        Commands::Generate(args) => generate_code(args, &config),
        Commands::Normalize { amount } => {
            println!("{}", normalize_amount(&amount));
            Ok(())
        }
        Commands::Decode(args) => decode(args),
    }
}

impl FormArgs {
    fn flag_values(&self) -> [(FieldName, &Option<String>); 12] {
        [
            (FieldName::PayeeVpa, &self.payee_vpa),
            (FieldName::PayeeName, &self.payee_name),
            (FieldName::Amount, &self.amount),
            (FieldName::Currency, &self.currency),
            (FieldName::TransactionNote, &self.transaction_note),
            (FieldName::MerchantCode, &self.merchant_code),
            (FieldName::MinimumAmount, &self.minimum_amount),
            (FieldName::MaximumAmount, &self.maximum_amount),
            (FieldName::TransactionRef, &self.transaction_ref),
            (FieldName::MerchantCategoryCode, &self.merchant_category_code),
            (FieldName::MerchantCity, &self.merchant_city),
            (FieldName::MerchantPinCode, &self.merchant_pin_code),
        ]
    }

    /// Build the form the way a user would fill it in: load, type, leave
    /// each field.
    fn to_form(&self, config: &ToolsConfig) -> Result<FormState> {
        let fields = match &self.form {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let value: serde_json::Value = serde_json::from_str(&text)
                    .with_context(|| format!("failed to parse form {}", path.display()))?;
                let has_currency = value.get(FieldName::Currency.form_name()).is_some();
                let mut fields = serde_json::from_value::<PaymentFields>(value)
                    .with_context(|| format!("failed to parse form {}", path.display()))?;
                if !has_currency {
                    fields.currency = config.currency.clone();
                }
                fields
            }
            None => PaymentFields {
                currency: config.currency.clone(),
                ..PaymentFields::default()
            },
        };
        let mut form = FormState::from_fields(fields);

        for (field, value) in self.flag_values() {
            if let Some(value) = value {
                form.set(field, value.as_str());
            }
        }

        for entry in &self.set {
            let Some((name, value)) = entry.split_once('=') else {
                bail!("expected FIELD=VALUE, got {}", entry);
            };
            let field: FieldName = name.parse()?;
            form.set(field, value);
        }

        if !self.raw_amounts {
            for field in FieldName::ALL.into_iter().filter(FieldName::is_amount) {
                form.blur(field);
            }
        }

        let currency = &form.get().currency;
        if !currency.is_empty() && !SUPPORTED_CURRENCIES.contains(&currency.as_str()) {
            tracing::warn!("currency {} is not one of {:?}", currency, SUPPORTED_CURRENCIES);
        }

        Ok(form)
    }
}

impl GenerateArgs {
    fn options(&self, config: &ToolsConfig) -> QrOptions {
        QrOptions {
            width: self.width.unwrap_or(config.width),
            margin: self.margin.unwrap_or(config.margin),
            dark: self.dark.clone().unwrap_or_else(|| config.dark.clone()),
            light: self.light.clone().unwrap_or_else(|| config.light.clone()),
            format: self.format,
        }
    }
}

fn encode(args: EncodeArgs, config: &ToolsConfig) -> Result<()> {
    let form = args.form.to_form(config)?;
    println!("{}", form.encode()?);
    Ok(())
}

fn generate_code(args: GenerateArgs, config: &ToolsConfig) -> Result<()> {
    let form = args.form.to_form(config)?;
    let options = args.options(config);
    let code = generate(form.get(), &QrRasterizer, &options)?;

    let data_uri = args.data_uri.then(|| code.image.to_data_uri());

    if options.format == QrFormat::Terminal {
        if !args.json {
            print!("{}", code.image.as_text().unwrap_or_default());
            println!();
            println!("{}", code.uri);
        } else {
            print_json(&GenerateSummary {
                uri: code.uri,
                format: options.format.to_string(),
                file: None,
                shared: false,
                data_uri,
            })?;
        }
        return Ok(());
    }

    let out_dir = args.out_dir.clone().unwrap_or_else(|| config.out_dir.clone());
    let outcome = (if args.share {
        let target: Box<dyn ShareTarget> = match config
            .share_command
            .as_deref()
            .and_then(CommandShare::from_command_line)
        {
            Some(command) => Box::new(command),
            None => Box::new(NoShare),
        };
        share_or_download(&code.image, &out_dir, target.as_ref())
    } else {
        download(&code.image, &out_dir).map(ShareOutcome::Downloaded)
    })
    .with_context(|| format!("failed to save QR code to {}", out_dir.display()))?;

    let summary = GenerateSummary {
        uri: code.uri,
        format: options.format.to_string(),
        file: Some(outcome.path().display().to_string()),
        shared: matches!(outcome, ShareOutcome::Shared(_)),
        data_uri,
    };

    if args.json {
        return print_json(&summary);
    }

    println!("{}", summary.uri);
    match outcome {
        ShareOutcome::Shared(path) => println!("Shared {}", path.display()),
        ShareOutcome::Downloaded(path) => println!("Saved {}", path.display()),
    }
    if let Some(data_uri) = summary.data_uri {
        println!("{}", data_uri);
    }
    Ok(())
}

fn decode(args: DecodeArgs) -> Result<()> {
    let fields = parse_uri(&args.uri).with_context(|| format!("invalid link {}", args.uri))?;

    if args.json {
        return print_json(&fields);
    }

    for (field, value) in fields.iter().filter(|(_, v)| !v.is_empty()) {
        println!("{:<24} {}", format!("{}:", field.label()), value);
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_from(args: &[&str]) -> Result<FormState> {
        let cli = Cli::try_parse_from(args)?;
        match cli.command {
            Commands::Encode(encode) => encode.form.to_form(&ToolsConfig::default()),
            Commands::Generate(generate) => generate.form.to_form(&ToolsConfig::default()),
            _ => bail!("not a form command"),
        }
    }

    #[test]
    fn test_encode_flags() {
        let form = form_from(&[
            "upiqr", "encode", "--vpa", "m@b", "--amount", "5", "--name", "A B",
        ])
        .unwrap();
        assert_eq!(
            form.encode().unwrap(),
            "upi://pay?pa=m%40b&pn=A%20B&am=5.00&cu=INR"
        );
    }

    #[test]
    fn test_raw_amounts() {
        let form = form_from(&["upiqr", "encode", "--pa", "m@b", "--amount", "5", "--raw-amounts"])
            .unwrap();
        assert_eq!(form.get().amount, "5");
    }

    #[test]
    fn test_generic_setter() {
        let form = form_from(&[
            "upiqr", "encode", "--vpa", "m@b", "--set", "tn=Rent", "--set", "mxam=10.1",
        ])
        .unwrap();
        assert_eq!(form.get().transaction_note, "Rent");
        assert_eq!(form.get().maximum_amount, "10.10");

        assert!(form_from(&["upiqr", "encode", "--set", "nope"]).is_err());
        assert!(form_from(&["upiqr", "encode", "--set", "iban=1"]).is_err());
    }

    #[test]
    fn test_form_file_with_flag_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        fs::write(
            &path,
            r#"{"payeeVPA":"file@upi","amount":"7.5","merchantCity":"Kochi"}"#,
        )
        .unwrap();

        let form = form_from(&[
            "upiqr",
            "encode",
            "--form",
            path.to_str().unwrap(),
            "--city",
            "Mysuru",
        ])
        .unwrap();
        assert_eq!(form.get().payee_vpa, "file@upi");
        assert_eq!(form.get().amount, "7.50");
        assert_eq!(form.get().merchant_city, "Mysuru");
    }

    #[test]
    fn test_form_file_currency_falls_back_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let without = dir.path().join("without.json");
        fs::write(&without, r#"{"payeeVPA":"file@upi"}"#).unwrap();
        let with = dir.path().join("with.json");
        fs::write(&with, r#"{"payeeVPA":"file@upi","currency":"EUR"}"#).unwrap();

        let config = ToolsConfig {
            currency: "USD".to_string(),
            ..ToolsConfig::default()
        };
        let form_for = |path: &std::path::Path| {
            let args = FormArgs {
                form: Some(path.to_path_buf()),
                ..FormArgs::default()
            };
            args.to_form(&config).unwrap()
        };

        assert_eq!(form_for(&without).get().currency, "USD");
        assert_eq!(form_for(&with).get().currency, "EUR");
    }

    #[test]
    fn test_missing_form_file() {
        let err = form_from(&["upiqr", "encode", "--form", "/nonexistent/form.json"]).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_generate_options_merge_config() {
        let cli = Cli::try_parse_from([
            "upiqr", "generate", "--vpa", "m@b", "--format", "svg", "--width", "512",
        ])
        .unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let config = ToolsConfig {
            margin: 6,
            ..ToolsConfig::default()
        };
        let options = args.options(&config);
        assert_eq!(options.format, QrFormat::Svg);
        assert_eq!(options.width, 512);
        assert_eq!(options.margin, 6);
        assert_eq!(options.dark, "#000000");
    }

    #[test]
    fn test_generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "upiqr",
            "generate",
            "--vpa",
            "m@b",
            "--out-dir",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        generate_code(args, &ToolsConfig::default()).unwrap();
        assert!(dir.path().join("upi-qr-code.png").exists());
    }

    #[test]
    fn test_generate_without_payee_fails() {
        let cli = Cli::try_parse_from(["upiqr", "generate", "--amount", "5"]).unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let err = generate_code(args, &ToolsConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "Payee VPA is required");
    }
}
