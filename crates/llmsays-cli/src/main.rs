// crates/llmsays-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use llmsays_core::{
    io::{read_disclosure, read_fragments, read_outcome, write_json_pretty},
    Disclosure, ResponseEnvelope, ResponseReport, Verifier, VerifierConfig,
};
use llmsays_crypto::{hash_fragment, VerifyingKey};
use llmsays_merkle::{
    read_manifest_auto, validate_fragments_against_manifest, validate_manifest,
    write_manifest_auto,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "llmsays",
    about = "Verify attested LLM output",
    long_about = "Verify attested LLM output.\n\nChecks that an envelope's Merkle root was signed by the attestor (origin) and that its fragments are committed under that root (response).",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(flatten)]
    opts: GlobalOpts,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Attestor public key (x-coordinate, hex). Defaults to the deployed attestor.
    #[arg(long, global = true, env = "LLMSAYS_VERIFYING_KEY")]
    verifying_key: Option<String>,

    /// Skip replaying the leaf's inclusion proof during response verification.
    #[arg(long, global = true, default_value_t = false)]
    no_inclusion_proof: bool,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Check the attestor's signature over the envelope's root
    VerifyOrigin {
        /// Envelope JSON (`-` for stdin)
        #[arg(long)]
        envelope: PathBuf,
    },

    /// Check that one fragment is committed under the envelope's root
    VerifyResponse {
        /// Envelope JSON (`-` for stdin)
        #[arg(long)]
        envelope: PathBuf,

        /// Leaf index of the fragment (order depends on the envelope layout)
        #[arg(long, conflicts_with = "response_index", required_unless_present = "response_index")]
        index: Option<usize>,

        /// Index within the response fragments
        #[arg(long)]
        response_index: Option<usize>,
    },

    /// Run origin and response verification (default: first response fragment)
    Verify {
        /// Envelope JSON (`-` for stdin)
        #[arg(long)]
        envelope: PathBuf,

        /// Leaf index of the fragment (order depends on the envelope layout)
        #[arg(long, conflicts_with = "response_index")]
        index: Option<usize>,

        /// Index within the response fragments
        #[arg(long)]
        response_index: Option<usize>,
    },

    /// Print the leaf digest committing a fragment
    Hash {
        /// Fragment text, hashed over its UTF-8 bytes
        text: String,
    },

    /// Extract one fragment with its inclusion proof as a standalone disclosure
    Proof {
        /// Envelope JSON (`-` for stdin)
        #[arg(long)]
        envelope: PathBuf,

        /// Leaf index of the fragment (order depends on the envelope layout)
        #[arg(long)]
        index: usize,

        /// Write the disclosure here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Verify a disclosure produced by `proof`
    VerifyDisclosure {
        /// Disclosure JSON (`-` for stdin)
        #[arg(long)]
        disclosure: PathBuf,
    },

    /// Commit a `{thinking, response}` fragments file and write a manifest
    Commit {
        /// Fragments JSON
        #[arg(long)]
        fragments: PathBuf,

        /// Output path for the manifest (CBOR/JSON)
        #[arg(long, default_value = "manifest.json")]
        out: PathBuf,
    },

    /// Check that a fragments file matches a manifest
    VerifyCommit {
        /// Fragments JSON
        #[arg(long)]
        fragments: PathBuf,

        /// Input path to manifest (CBOR/JSON)
        #[arg(long)]
        manifest: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let json = cli.opts.json;
    match cli.cmd {
        Cmd::VerifyOrigin { envelope } => verify_origin(&verifier(&cli.opts)?, &envelope, json),

        Cmd::VerifyResponse {
            envelope,
            index,
            response_index,
        } => verify_response(&verifier(&cli.opts)?, &envelope, index, response_index, json),

        Cmd::Verify {
            envelope,
            index,
            response_index,
        } => verify_all(&verifier(&cli.opts)?, &envelope, index, response_index, json),

        Cmd::Hash { text } => hash(&text, json),

        Cmd::Proof {
            envelope,
            index,
            out,
        } => proof(&envelope, index, out.as_deref()),

        Cmd::VerifyDisclosure { disclosure } => {
            verify_disclosure(&verifier(&cli.opts)?, &disclosure, json)
        }

        Cmd::Commit { fragments, out } => commit(&fragments, &out),

        Cmd::VerifyCommit {
            fragments,
            manifest,
        } => verify_commit(&fragments, &manifest),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Default config with CLI flags layered on top.
///
/// clap already resolves `LLMSAYS_VERIFYING_KEY` into `--verifying-key`, so
/// only the inclusion-proof switch is read from the environment here.
fn verifier(opts: &GlobalOpts) -> Result<Verifier> {
    let mut cfg = VerifierConfig::default().with_inclusion_proof_from_env();
    if let Some(hex) = opts.verifying_key.as_deref() {
        cfg.verifying_key = VerifyingKey::from_hex(hex).context("parsing --verifying-key")?;
    }
    if opts.no_inclusion_proof {
        cfg.check_inclusion_proof = false;
    }
    Ok(Verifier::new(cfg))
}

fn load_envelope(path: &Path) -> Result<ResponseEnvelope> {
    let outcome = read_outcome(path)?;
    outcome
        .into_envelope()
        .with_context(|| format!("envelope {}", path.display()))
}

/// Global index from `--index`, `--response-index`, or the first response fragment.
fn resolve_index(
    env: &ResponseEnvelope,
    index: Option<usize>,
    response_index: Option<usize>,
) -> Result<usize> {
    match (index, response_index) {
        (Some(i), _) => Ok(i),
        (None, Some(j)) => env.response_index(j).ok_or_else(|| {
            anyhow!(
                "response fragment {j} does not exist ({} response fragments)",
                env.response().len()
            )
        }),
        (None, None) => env
            .response_index(0)
            .ok_or_else(|| anyhow!("envelope has no response fragments; pass --index")),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).context("serialize JSON to stdout")?;
    writeln!(out)?;
    Ok(())
}

const fn mark(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "FAILED"
    }
}

fn print_response(r: &ResponseReport) {
    println!("root:     {} (claimed {})", mark(r.root_matches), r.claimed_root);
    if !r.root_matches {
        println!("          recomputed {}", r.recomputed_root);
    }
    println!("fragment: {} (index {}, leaf {})", mark(r.fragment_matches), r.index, r.leaf);
    match r.proof_verifies {
        Some(ok) => println!("proof:    {}", mark(ok)),
        None => println!("proof:    skipped"),
    }
}

fn verify_origin(verifier: &Verifier, envelope: &Path, json: bool) -> Result<()> {
    info!(envelope=%envelope.display(), "verifying origin");
    let env = load_envelope(envelope)?;
    let report = verifier.origin_verify(&env)?;

    if json {
        print_json(&report)?;
    } else {
        println!("origin:   {} (root {}, key {})", mark(report.valid), report.root, report.verifying_key);
    }
    if !report.valid {
        bail!("signature over root {} does not verify under {}", report.root, report.verifying_key);
    }
    Ok(())
}

fn verify_response(
    verifier: &Verifier,
    envelope: &Path,
    index: Option<usize>,
    response_index: Option<usize>,
    json: bool,
) -> Result<()> {
    let env = load_envelope(envelope)?;
    let idx = resolve_index(&env, index, response_index)?;
    info!(envelope=%envelope.display(), index = idx, "verifying response commitment");
    let report = verifier.response_verify(&env, idx)?;

    if json {
        print_json(&report)?;
    } else {
        print_response(&report);
    }
    if let Some(first) = report.failures.first() {
        bail!("response verification failed: {first}");
    }
    Ok(())
}

fn verify_all(
    verifier: &Verifier,
    envelope: &Path,
    index: Option<usize>,
    response_index: Option<usize>,
    json: bool,
) -> Result<()> {
    let env = load_envelope(envelope)?;
    let idx = resolve_index(&env, index, response_index)?;
    info!(envelope=%envelope.display(), index = idx, "verifying envelope");
    let report = verifier.verify(&env, idx)?;

    if json {
        print_json(&report)?;
    } else {
        println!("origin:   {} (key {})", mark(report.origin.valid), report.origin.verifying_key);
        print_response(&report.response);
    }

    let failures: Vec<String> = report.failures().map(ToString::to_string).collect();
    if !failures.is_empty() {
        bail!("verification failed: {}", failures.join("; "));
    }
    Ok(())
}

fn hash(text: &str, json: bool) -> Result<()> {
    let leaf = hash_fragment(text);
    if json {
        print_json(&serde_json::json!({ "text": text, "leaf": leaf }))?;
    } else {
        println!("{leaf}");
    }
    Ok(())
}

fn proof(envelope: &Path, index: usize, out: Option<&Path>) -> Result<()> {
    let env = load_envelope(envelope)?;
    let disclosure = Disclosure::from_envelope(&env, index)
        .with_context(|| format!("building disclosure for fragment {index}"))?;
    info!(index, depth = disclosure.proof.steps.len(), "inclusion proof built");

    match out {
        Some(path) => {
            write_json_pretty(path, &disclosure)
                .with_context(|| format!("writing disclosure to {}", path.display()))?;
            println!("Disclosed fragment {index} → {}", path.display());
        }
        None => print_json(&disclosure)?,
    }
    Ok(())
}

fn verify_disclosure(verifier: &Verifier, path: &Path, json: bool) -> Result<()> {
    info!(disclosure=%path.display(), "verifying disclosure");
    let disclosure = read_disclosure(path)?;
    let report = verifier.verify_disclosure(&disclosure)?;

    if json {
        print_json(&report)?;
    } else {
        println!("origin:   {} (root {})", mark(report.origin.valid), report.origin.root);
        println!("fragment: {} (index {})", mark(report.fragment_matches), report.index);
        println!("proof:    {}", mark(report.proof_verifies));
    }
    if !report.is_valid() {
        bail!("disclosure for fragment {} does not verify", report.index);
    }
    Ok(())
}

fn commit(fragments: &Path, out: &Path) -> Result<()> {
    info!(fragments=%fragments.display(), out=%out.display(), "committing fragments");
    let frags = read_fragments(fragments)?;
    let manifest = frags
        .commit()
        .with_context(|| format!("committing {}", fragments.display()))?;
    write_manifest_auto(out, &manifest)
        .with_context(|| format!("writing manifest {}", out.display()))?;

    println!(
        "Committed {} fragments → root {} → {}",
        manifest.leaves.len(),
        manifest.root,
        out.display()
    );
    Ok(())
}

fn verify_commit(fragments: &Path, manifest: &Path) -> Result<()> {
    info!(fragments=%fragments.display(), manifest=%manifest.display(), "verifying commit");
    let frags = read_fragments(fragments)?;
    let man = read_manifest_auto(manifest)?;
    validate_manifest(&man).with_context(|| format!("manifest {}", manifest.display()))?;

    let all: Vec<&str> = frags.iter().collect();
    validate_fragments_against_manifest(&all, &man).with_context(|| {
        format!(
            "verifying that {} matches manifest {}",
            fragments.display(),
            manifest.display()
        )
    })?;

    println!(
        "OK: {} matches manifest {}",
        fragments.display(),
        manifest.display()
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use llmsays_core::{Fragments, Heuristics, Signature, DEFAULT_VERIFYING_KEY};

    fn envelope(thinking: usize, response: usize) -> ResponseEnvelope {
        let fragments = Fragments {
            thinking: (0..thinking).map(|i| format!("t{i}")).collect(),
            response: (0..response).map(|i| format!("r{i}")).collect(),
        };
        let man = fragments.commit().unwrap();
        let sig = Signature::from_hex("0x1", "0x2").unwrap();
        ResponseEnvelope::new(fragments, Heuristics::new(man.leaves, man.root, sig))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verify_response_needs_a_target() {
        assert!(Cli::try_parse_from(["llmsays", "verify-response", "--envelope", "e.json"]).is_err());
        assert!(Cli::try_parse_from([
            "llmsays",
            "verify-response",
            "--envelope",
            "e.json",
            "--index",
            "1",
            "--response-index",
            "0"
        ])
        .is_err());
        let cli = Cli::try_parse_from([
            "llmsays",
            "--json",
            "verify-response",
            "--envelope",
            "-",
            "--response-index",
            "0",
        ])
        .unwrap();
        assert!(cli.opts.json);
    }

    #[test]
    fn index_resolution() {
        let env = envelope(3, 2);
        assert_eq!(resolve_index(&env, Some(1), None).unwrap(), 1);
        assert_eq!(resolve_index(&env, None, Some(1)).unwrap(), 4);
        assert_eq!(resolve_index(&env, None, None).unwrap(), 3);
        assert!(resolve_index(&env, None, Some(2)).is_err());
        assert!(resolve_index(&envelope(2, 0), None, None).is_err());
    }

    #[test]
    fn explicit_key_wins_over_malformed_env_key() {
        std::env::set_var("LLMSAYS_VERIFYING_KEY", "zz");
        let cli = Cli::try_parse_from([
            "llmsays",
            "--verifying-key",
            DEFAULT_VERIFYING_KEY,
            "verify-origin",
            "--envelope",
            "e.json",
        ]);
        std::env::remove_var("LLMSAYS_VERIFYING_KEY");

        let cli = cli.unwrap();
        assert_eq!(cli.opts.verifying_key.as_deref(), Some(DEFAULT_VERIFYING_KEY));
        let v = verifier(&cli.opts).unwrap();
        assert_eq!(*v.verifying_key(), VerifierConfig::default_verifying_key());
    }

    #[test]
    fn flag_overrides_key_and_proof_check() {
        let opts = GlobalOpts {
            verifying_key: Some("0x1234".into()),
            no_inclusion_proof: true,
            json: false,
        };
        let v = verifier(&opts).unwrap();
        assert_eq!(*v.verifying_key(), VerifyingKey::from_hex("0x1234").unwrap());
        assert!(!v.config().check_inclusion_proof);
    }
}
