use strum_macros::{Display, IntoStaticStr};

/// Binary outcome of the waste classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum Verdict {
    #[strum(serialize = "Non-Recyclable")]
    NonRecyclable,
    #[strum(serialize = "Recyclable")]
    Recyclable,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        (*self).into()
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Verdict::NonRecyclable => "Dispose the item in the non-recyclable bin",
            Verdict::Recyclable => "Dispose the item in a recyclables bin",
        }
    }
}

/// Verdict for one upload, echoed back alongside the stored image.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub verdict: Verdict,
    pub image_url: String,
}

impl ClassificationResult {
    pub fn new(verdict: Verdict, image_url: impl Into<String>) -> Self {
        Self {
            verdict,
            image_url: image_url.into(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.verdict.label()
    }

    pub fn recommendation(&self) -> &'static str {
        self.verdict.recommendation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_recommendations_are_paired() {
        assert_eq!(Verdict::NonRecyclable.label(), "Non-Recyclable");
        assert_eq!(
            Verdict::NonRecyclable.recommendation(),
            "Dispose the item in the non-recyclable bin"
        );
        assert_eq!(Verdict::Recyclable.label(), "Recyclable");
        assert_eq!(
            Verdict::Recyclable.recommendation(),
            "Dispose the item in a recyclables bin"
        );
    }

    #[test]
    fn display_matches_label() {
        for verdict in [Verdict::NonRecyclable, Verdict::Recyclable] {
            assert_eq!(verdict.to_string(), verdict.label());
        }
    }

    #[test]
    fn result_derives_text_from_verdict() {
        let result = ClassificationResult::new(Verdict::Recyclable, "/static/uploads/a.jpg");
        assert_eq!(result.label(), "Recyclable");
        assert_eq!(result.recommendation(), "Dispose the item in a recyclables bin");
        assert_eq!(result.image_url, "/static/uploads/a.jpg");
    }
}
