//! Built-in SRE knowledge base used when no article file is configured.

use crate::models::{ArticleRecord, TagList};

type SeedRow = (&'static str, &'static str, &'static str, &'static str, &'static str, &'static str);

// (title, category, description, url, source type, tags)
const SEED: [SeedRow; 15] = [
    (
        "Incident Response Runbook",
        "Incident Management",
        "Step-by-step guide for P1/P2 incident response including escalation paths and communication templates.",
        "https://confluence.internal/sre/incident-runbook",
        "internal",
        "incident,runbook,P1,P2,escalation,on-call",
    ),
    (
        "Chaos Engineering Playbook",
        "Reliability Testing",
        "Framework for designing and executing chaos experiments using AWS FIS and custom fault injection.",
        "https://confluence.internal/sre/chaos-engineering",
        "internal",
        "chaos,engineering,fault-injection,FIS,resilience,testing",
    ),
    (
        "SLO/SLI Definition Guide",
        "Observability",
        "How to define, measure, and alert on Service Level Objectives and Indicators across the platform.",
        "https://confluence.internal/sre/slo-sli-guide",
        "internal",
        "SLO,SLI,SLA,observability,alerting,error-budget",
    ),
    (
        "Dynatrace Monitoring Setup",
        "Observability",
        "Configuration guide for Dynatrace real user monitoring, synthetic monitors, and custom dashboards.",
        "https://confluence.internal/sre/dynatrace-setup",
        "internal",
        "dynatrace,monitoring,RUM,synthetic,dashboard,APM",
    ),
    (
        "Harness CI/CD Pipeline Guide",
        "Deployment",
        "Best practices for configuring Harness pipelines with canary deployments and automated rollback.",
        "https://confluence.internal/sre/harness-pipelines",
        "internal",
        "harness,CI/CD,pipeline,canary,deployment,rollback",
    ),
    (
        "Kubernetes Troubleshooting",
        "Infrastructure",
        "Common K8s issues and resolution steps including pod failures, resource limits, and networking.",
        "https://confluence.internal/sre/k8s-troubleshooting",
        "internal",
        "kubernetes,k8s,pods,troubleshooting,networking,OOM",
    ),
    (
        "Disaster Recovery Plan",
        "Business Continuity",
        "DR procedures including RTO/RPO targets, failover automation, and recovery validation.",
        "https://confluence.internal/sre/disaster-recovery",
        "internal",
        "DR,disaster,recovery,failover,RTO,RPO,business-continuity",
    ),
    (
        "Terraform IaC Standards",
        "Infrastructure",
        "Infrastructure as Code standards, module conventions, and state management best practices.",
        "https://confluence.internal/sre/terraform-standards",
        "internal",
        "terraform,IaC,infrastructure,modules,state,automation",
    ),
    (
        "Google SRE Book",
        "External Resources",
        "Google's comprehensive guide to Site Reliability Engineering principles and practices.",
        "https://sre.google/sre-book/table-of-contents/",
        "external",
        "SRE,google,reliability,principles,toil,error-budget",
    ),
    (
        "Prometheus Monitoring Guide",
        "External Resources",
        "Official Prometheus documentation for metrics collection, PromQL, and alerting.",
        "https://prometheus.io/docs/introduction/overview/",
        "external",
        "prometheus,metrics,PromQL,alerting,monitoring,TSDB",
    ),
    (
        "PagerDuty Incident Ops Guide",
        "External Resources",
        "PagerDuty's guide to incident operations including on-call best practices and postmortems.",
        "https://response.pagerduty.com/",
        "external",
        "pagerduty,incident,on-call,postmortem,operations",
    ),
    (
        "AWS Well-Architected Reliability",
        "External Resources",
        "AWS reliability pillar covering fault tolerance, disaster recovery, and scaling strategies.",
        "https://docs.aws.amazon.com/wellarchitected/latest/reliability-pillar/",
        "external",
        "AWS,reliability,well-architected,fault-tolerance,scaling",
    ),
    (
        "Grafana Dashboard Best Practices",
        "Observability",
        "Guidelines for creating effective Grafana dashboards with proper panel organization and alerting.",
        "https://confluence.internal/sre/grafana-dashboards",
        "internal",
        "grafana,dashboard,visualization,alerting,panels",
    ),
    (
        "On-Call Rotation & Escalation Policy",
        "Incident Management",
        "On-call scheduling, escalation tiers, and handoff procedures for the SRE team.",
        "https://confluence.internal/sre/on-call-policy",
        "internal",
        "on-call,rotation,escalation,schedule,handoff,PagerDuty",
    ),
    (
        "Postmortem Template & Process",
        "Incident Management",
        "Blameless postmortem template with timeline, root cause analysis, and action item tracking.",
        "https://confluence.internal/sre/postmortem-template",
        "internal",
        "postmortem,blameless,RCA,root-cause,timeline,action-items",
    ),
];

/// The seed set as raw records, ids `1..=15` in insertion order.
pub fn seed_records() -> Vec<ArticleRecord> {
    SEED.iter()
        .zip(1u64..)
        .map(
            |(&(title, category, description, url, source_type, tags), id)| ArticleRecord {
                id: Some(id),
                title: Some(title.to_string()),
                category: Some(category.to_string()),
                description: Some(description.to_string()),
                url: Some(url.to_string()),
                source_type: Some(source_type.to_string()),
                tags: Some(TagList::Joined(tags.to_string())),
                malformed: None,
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KnowledgeBase;

    #[test]
    fn every_seed_record_is_valid() {
        let kb = KnowledgeBase::from_records(seed_records());
        assert_eq!(kb.len(), 15);
        assert!(kb.skipped().is_empty());
    }

    #[test]
    fn ids_follow_insertion_order() {
        let ids: Vec<Option<u64>> = seed_records().iter().map(|r| r.id).collect();
        assert_eq!(ids.first(), Some(&Some(1)));
        assert_eq!(ids.last(), Some(&Some(15)));
    }
}
