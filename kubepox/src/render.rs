use crate::core::{
    k8s::{netv1, LabelSelector, Selector},
    EgressRule, IngressRule, PolicyType, Selected,
};
use anyhow::Result;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Serialize;
use std::io::Write;

/// A rule's peers and ports, regardless of its direction.
pub(crate) trait Rule: Serialize {
    fn peers(&self) -> &[netv1::NetworkPolicyPeer];
    fn ports(&self) -> &[netv1::NetworkPolicyPort];
}

/// Writes each item as an indented JSON document under a numbered heading.
pub(crate) fn numbered<T: Serialize>(
    mut out: impl Write,
    heading: &str,
    items: impl IntoIterator<Item = T>,
) -> Result<()> {
    for (i, item) in items.into_iter().enumerate() {
        writeln!(out, "{heading} {}", i + 1)?;
        serde_json::to_writer_pretty(&mut out, &item)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Describes the rules that apply to a pod in one direction.
pub(crate) fn rules<R: Rule>(
    mut out: impl Write,
    pod: &str,
    direction: PolicyType,
    rules: Option<&[&R]>,
    human: bool,
) -> Result<()> {
    let rules = match rules {
        None => {
            writeln!(
                out,
                "No policy restricts {direction} traffic for pod {pod}; all {direction} traffic is allowed"
            )?;
            return Ok(());
        }
        Some([]) => {
            writeln!(out, "All {direction} traffic for pod {pod} is denied")?;
            return Ok(());
        }
        Some(rules) => rules,
    };

    writeln!(out, "Allowed {direction} traffic for pod {pod}:")?;
    writeln!(out)?;
    if human {
        return table(out, rules);
    }
    numbered(out, "RULE", rules)
}

pub(crate) fn selected(mut out: impl Write, pod: &str, selected: Selected) -> Result<()> {
    writeln!(out, "Isolation for pod {pod}:")?;
    serde_json::to_writer_pretty(&mut out, &selected)?;
    writeln!(out)?;
    Ok(())
}

/// Renders one row per rule peer.
fn table<R: Rule>(mut out: impl Write, rules: &[&R]) -> Result<()> {
    const HEADER: [&str; 4] = ["RULE", "ENTRY", "PEER SELECTOR", "PORTS"];

    let mut rows = Vec::new();
    for (r, rule) in rules.iter().enumerate() {
        let ports = ports(rule.ports());
        if rule.peers().is_empty() {
            rows.push([(r + 1).to_string(), "1".to_string(), "ALL".to_string(), ports]);
            continue;
        }
        for (e, peer) in rule.peers().iter().enumerate() {
            rows.push([
                (r + 1).to_string(),
                (e + 1).to_string(),
                self::peer(peer)?,
                ports.clone(),
            ]);
        }
    }

    let mut widths = HEADER.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let header = HEADER.map(str::to_string);
    for row in std::iter::once(&header).chain(&rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

fn peer(peer: &netv1::NetworkPolicyPeer) -> Result<String> {
    let mut parts = Vec::new();
    if let Some(sel) = peer.namespace_selector.as_ref() {
        parts.push(format!("namespaces({})", selector(sel)?));
    }
    if let Some(sel) = peer.pod_selector.as_ref() {
        parts.push(format!("pods({})", selector(sel)?));
    }
    if let Some(block) = peer.ip_block.as_ref() {
        let mut cidr = format!("cidr({}", block.cidr);
        if let Some(except) = block.except.as_ref().filter(|e| !e.is_empty()) {
            cidr.push_str(" except ");
            cidr.push_str(&except.join(","));
        }
        cidr.push(')');
        parts.push(cidr);
    }
    Ok(parts.join(" "))
}

fn selector(selector: &LabelSelector) -> Result<String> {
    Ok(Selector::try_from(selector)?.to_string())
}

fn ports(ports: &[netv1::NetworkPolicyPort]) -> String {
    if ports.is_empty() {
        return "ALL".to_string();
    }

    ports
        .iter()
        .map(|p| {
            let proto = p.protocol.as_deref().unwrap_or("TCP");
            let port = match (p.port.as_ref(), p.end_port) {
                (None, _) => "*".to_string(),
                (Some(IntOrString::Int(port)), Some(end)) => format!("{port}-{end}"),
                (Some(IntOrString::Int(port)), None) => port.to_string(),
                (Some(IntOrString::String(name)), _) => name.clone(),
            };
            format!("{proto}:{port}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// === impl Rule ===

impl Rule for IngressRule {
    fn peers(&self) -> &[netv1::NetworkPolicyPeer] {
        self.from.as_deref().unwrap_or_default()
    }

    fn ports(&self) -> &[netv1::NetworkPolicyPort] {
        self.ports.as_deref().unwrap_or_default()
    }
}

impl Rule for EgressRule {
    fn peers(&self) -> &[netv1::NetworkPolicyPeer] {
        self.to.as_deref().unwrap_or_default()
    }

    fn ports(&self) -> &[netv1::NetworkPolicyPort] {
        self.ports.as_deref().unwrap_or_default()
    }
}
