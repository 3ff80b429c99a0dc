use std::collections::HashMap;

/// Exact-match canned replies answered locally, without consulting the
/// dialogue engine.
///
/// Lookup is byte-exact on the raw message. No trimming, no case folding:
/// "안녕 " with a trailing space goes to the engine like any other message.
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    replies: HashMap<String, String>,
}

impl RuleBook {
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        RuleBook {
            replies: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The built-in smalltalk rules the gateway ships with.
    pub fn with_default_rules() -> Self {
        Self::new([
            ("안녕", "안녕하세요! 무엇을 도와드릴까요?"),
            ("이름이 뭐야?", "저는 챗봇입니다."),
            ("잘 가", "안녕히 가세요!"),
        ])
    }

    pub fn lookup(&self, message: &str) -> Option<&str> {
        self.replies.get(message).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }
}
