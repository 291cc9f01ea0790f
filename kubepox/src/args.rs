use crate::{
    core::{self, PolicyType},
    fetch::Cluster,
    render,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use tokio::time::Duration;
use tracing::{debug, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "kubepox",
    version,
    about = "Shows which network policies apply to which pods"
)]
pub struct Args {
    #[clap(long, default_value = "kubepox=info,warn", env = "KUBEPOX_LOG")]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain", env = "KUBEPOX_LOG_FORMAT")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    /// Namespace to run the query in
    #[clap(long, short = 'n', default_value = "default")]
    namespace: String,

    /// Timeout for each request to the Kubernetes API, in milliseconds
    #[clap(long = "timeout", default_value = "5000")]
    timeout_ms: u64,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Prints every policy or pod in the namespace
    GetAll {
        #[clap(value_enum)]
        kind: Kind,
    },

    /// Prints the pods that a policy selects
    GetPods { policy: String },

    /// Prints the policies that select a pod
    GetPolicies { pod: String },

    /// Prints the traffic rules that apply to a pod
    GetRules {
        pod: String,

        /// Show egress rules instead of ingress rules
        #[clap(long)]
        egress: bool,

        /// Render the rules as a table rather than as JSON
        #[clap(long)]
        human: bool,
    },

    /// Prints whether a pod is isolated for ingress and egress
    IsSelected { pod: String },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    Policies,
    Pods,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            namespace,
            timeout_ms,
            command,
        } = self;

        log_format
            .try_init(log_level)
            .context("failed to configure logging")?;

        let client = client
            .try_client()
            .await
            .context("failed to configure Kubernetes client")?;
        let cluster = Cluster::new(client, &namespace, Duration::from_millis(timeout_ms));

        debug!(?command, %namespace, "Running query");
        command
            .run(&cluster, std::io::stdout().lock())
            .instrument(info_span!("query", ns = %namespace))
            .await
    }
}

// === impl Command ===

impl Command {
    async fn run(self, cluster: &Cluster, mut out: impl Write) -> Result<()> {
        match self {
            Self::GetAll { kind: Kind::Policies } => {
                let policies = cluster.policies().await?;
                render::numbered(out, "POLICY", &policies)
            }

            Self::GetAll { kind: Kind::Pods } => {
                let pods = cluster.pods().await?;
                render::numbered(out, "POD", &pods)
            }

            Self::GetPods { policy } => {
                let (policy, pods) = tokio::try_join!(cluster.policy(&policy), cluster.pods())?;
                let matched = core::list_pods_per_policy(&policy, &pods)
                    .with_context(|| format!("failed to match pods for policy {}", policy.name))?;
                writeln!(out, "Matched pods for policy {}:", policy.name)?;
                render::numbered(out, "POD", matched)
            }

            Self::GetPolicies { pod } => {
                let (pod, policies) = tokio::try_join!(cluster.pod(&pod), cluster.policies())?;
                let matched = core::list_policies_per_pod(&pod, &policies)
                    .with_context(|| format!("failed to match policies for pod {}", pod.name))?;
                writeln!(out, "Applied policies for pod {}:", pod.name)?;
                render::numbered(out, "POLICY", matched)
            }

            Self::GetRules { pod, egress, human } => {
                let (pod, policies) = tokio::try_join!(cluster.pod(&pod), cluster.policies())?;
                let context = || format!("failed to list rules for pod {}", pod.name);
                if egress {
                    let rules =
                        core::list_egress_rules_per_pod(&pod, &policies).with_context(context)?;
                    render::rules(out, &pod.name, PolicyType::Egress, rules.as_deref(), human)
                } else {
                    let rules =
                        core::list_ingress_rules_per_pod(&pod, &policies).with_context(context)?;
                    render::rules(out, &pod.name, PolicyType::Ingress, rules.as_deref(), human)
                }
            }

            Self::IsSelected { pod } => {
                let (pod, policies) = tokio::try_join!(cluster.pod(&pod), cluster.policies())?;
                let selected = core::is_pod_selected(&pod, &policies)
                    .with_context(|| format!("failed to check isolation for pod {}", pod.name))?;
                render::selected(out, &pod.name, selected)
            }
        }
    }
}
