use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::analysis::categorizer::{categorize, CategoryScores};
use crate::db::{Level, Response};

const TOP_TOPICS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct LevelStats {
    pub count: u64,
    pub first: DateTime<Utc>,
    pub last: DateTime<Utc>,
    /// Arithmetic mean of category scores across this level's responses.
    pub mean_scores: CategoryScores,
}

/// Everything the report renderer needs, recomputed from scratch on every
/// request. Levels with zero responses get no entry rather than a zero row.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateReport {
    pub total: u64,
    pub levels: BTreeMap<Level, LevelStats>,
    pub daily: Vec<(NaiveDate, u64)>,
    pub top_topics: Vec<(String, u64)>,
    /// Spoken questions and their assistant-clarified rewrites, in
    /// submission order, blank entries dropped.
    pub voice_questions: Vec<String>,
    pub clarified_questions: Vec<String>,
}

impl AggregateReport {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

struct LevelAccumulator {
    count: u64,
    first: DateTime<Utc>,
    last: DateTime<Utc>,
    score_sums: [f64; 3],
}

pub fn aggregate(responses: &[Response]) -> AggregateReport {
    let mut levels: BTreeMap<Level, LevelAccumulator> = BTreeMap::new();
    let mut daily: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    // Topic counts keep first-seen order so that ties sort deterministically.
    let mut topic_order: Vec<String> = Vec::new();
    let mut topic_counts: HashMap<String, u64> = HashMap::new();
    let mut voice_questions: Vec<String> = Vec::new();
    let mut clarified_questions: Vec<String> = Vec::new();

    for response in responses {
        let scores = categorize(&response_free_text(response));

        let entry = levels.entry(response.level).or_insert(LevelAccumulator {
            count: 0,
            first: response.timestamp,
            last: response.timestamp,
            score_sums: [0.0; 3],
        });
        entry.count += 1;
        entry.first = entry.first.min(response.timestamp);
        entry.last = entry.last.max(response.timestamp);
        entry.score_sums[0] += scores.technical;
        entry.score_sums[1] += scores.business;
        entry.score_sums[2] += scores.theoretical;

        *daily.entry(response.timestamp.date_naive()).or_insert(0) += 1;

        if let Some(question) = trimmed(&response.voice_question) {
            voice_questions.push(question);
        }
        if let Some(question) = trimmed(&response.clarified_question) {
            clarified_questions.push(question);
        }

        for topic in response.data.0.topic_values() {
            if !topic_counts.contains_key(&topic) {
                topic_order.push(topic.clone());
            }
            *topic_counts.entry(topic).or_insert(0) += 1;
        }
    }

    let mut top_topics: Vec<(String, u64)> = topic_order
        .into_iter()
        .map(|topic| {
            let count = topic_counts[&topic];
            (topic, count)
        })
        .collect();
    // Stable sort preserves first-seen order between equal counts.
    top_topics.sort_by(|a, b| b.1.cmp(&a.1));
    top_topics.truncate(TOP_TOPICS);

    AggregateReport {
        total: responses.len() as u64,
        levels: levels
            .into_iter()
            .map(|(level, acc)| {
                let n = acc.count as f64;
                let stats = LevelStats {
                    count: acc.count,
                    first: acc.first,
                    last: acc.last,
                    mean_scores: CategoryScores {
                        technical: acc.score_sums[0] / n,
                        business: acc.score_sums[1] / n,
                        theoretical: acc.score_sums[2] / n,
                    },
                };
                (level, stats)
            })
            .collect(),
        daily: daily.into_iter().collect(),
        top_topics,
        voice_questions,
        clarified_questions,
    }
}

fn trimmed(text: &Option<String>) -> Option<String> {
    text.as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn response_free_text(response: &Response) -> String {
    let mut blob = response.data.0.free_text();
    for text in [&response.voice_question, &response.clarified_question]
        .into_iter()
        .flatten()
    {
        blob.push(' ');
        blob.push_str(text);
    }
    blob
}
