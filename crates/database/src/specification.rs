/// Formats the rows of an aggregation process as `{(formula,expression),...}`.
///
/// Returns `None` when the process has no (constraint, function) pairs.
pub fn format_aggregation_specification<'a, I>(pairs: I) -> Option<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let parts: Vec<String> = pairs
        .into_iter()
        .map(|(formula, expression)| format!("({formula},{expression})"))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(format!("{{{}}}", parts.join(",")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specification_wraps_pairs_in_braces() {
        let spec = format_aggregation_specification([("ALL(x > 0)", "AVG"), ("ANY(x < 0)", "MIN")]);
        assert_eq!(spec.as_deref(), Some("{(ALL(x > 0),AVG),(ANY(x < 0),MIN)}"));
    }

    #[test]
    fn specification_of_single_pair() {
        let spec = format_aggregation_specification([("c", "f")]);
        assert_eq!(spec.as_deref(), Some("{(c,f)}"));
    }

    #[test]
    fn empty_specification_is_none() {
        assert_eq!(format_aggregation_specification(std::iter::empty()), None);
    }
}
