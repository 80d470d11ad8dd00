//! Plain-text rendering of search reports

use haplosig::{DuplicateGroup, GroupReport, HaplotypeReport, SearchStrategy, UniqueReport};

pub fn render_report(report: &HaplotypeReport) -> String {
    let (strategy, body) = match report {
        HaplotypeReport::Group(report) => (SearchStrategy::GreedyGroup, render_group(report)),
        HaplotypeReport::Unique(report) => (SearchStrategy::ExhaustiveUnique, render_unique(report)),
    };
    format!("{}\n{}", strategy.description(), body)
}

fn render_group(report: &GroupReport) -> String {
    let mut lines = vec![
        format!(
            "Group \"{}\": {} alleles against {} others",
            report.prefix,
            report.group.len(),
            report.other_count
        ),
        format!("Common mutations: {}", report.common_mutations.len()),
        format!("First {} mutations and their frequencies", report.least_frequent.len()),
    ];
    for ranked in &report.least_frequent {
        lines.push(format!("\t{} - {}", ranked.mutation, ranked.frequency));
    }
    lines.push(format!(
        "Signature: ({}) - {}",
        report.signature.len(),
        report.signature
    ));
    lines.join("\n") + "\n"
}

fn render_unique(report: &UniqueReport) -> String {
    let mut lines = vec![format!(
        "{}: {} minimal signatures of up to {} mutations ({} candidates, {} nodes)",
        report.allele,
        report.signatures.len(),
        report.max_signature_size,
        report.candidate_mutations,
        report.nodes_visited
    )];
    for signature in &report.signatures {
        lines.push(format!("\t({}) {}", signature.len(), signature));
    }
    lines.join("\n") + "\n"
}

pub fn render_duplicates(duplicates: &[DuplicateGroup]) -> String {
    if duplicates.is_empty() {
        return "No duplicate sequences\n".to_string();
    }
    duplicates
        .iter()
        .map(|group| format!("{}\n", group.names.join(", ")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use haplosig::{Mutation, RankedMutation, Signature};

    #[test]
    fn test_render_group() {
        let signature: Signature = [Mutation::new(0, 'A')].into_iter().collect();
        let report = HaplotypeReport::Group(GroupReport {
            prefix: "B*15".to_string(),
            group: vec!["B*1501".to_string(), "B*1502".to_string()],
            other_count: 3,
            common_mutations: signature.clone(),
            least_frequent: vec![RankedMutation {
                mutation: Mutation::new(0, 'A'),
                frequency: 0,
            }],
            signature,
        });
        let text = render_report(&report);
        assert!(text.starts_with("Greedy group signature\n"));
        assert!(text.contains("2 alleles against 3 others"));
        assert!(text.contains("\t[0:A] - 0"));
        assert!(text.ends_with("Signature: (1) - [0:A]\n"));
    }

    #[test]
    fn test_render_unique_header() {
        let report = HaplotypeReport::Unique(UniqueReport {
            allele: "B*0801".to_string(),
            candidate_mutations: 4,
            max_signature_size: 5,
            nodes_visited: 9,
            signatures: vec![[Mutation::new(3, 'A')].into_iter().collect()],
        });
        let text = render_report(&report);
        assert!(text.starts_with("Exhaustive unique signatures\nB*0801: 1 minimal signatures"));
        assert!(text.ends_with("\t(1) [3:A]\n"));
    }

    #[test]
    fn test_render_duplicates() {
        assert_eq!(render_duplicates(&[]), "No duplicate sequences\n");
        let groups = [DuplicateGroup {
            names: vec!["x".to_string(), "y".to_string()],
        }];
        assert_eq!(render_duplicates(&groups), "x, y\n");
    }
}
