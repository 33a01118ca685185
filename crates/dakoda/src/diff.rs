//! Context diffs of token sequences.
//!
//! The output format is the one of Python's `difflib.context_diff`
//! with empty file names, one token per line. Matching blocks are
//! found with the Ratcliff/Obershelp algorithm, including the
//! "popular element" heuristic for sequences of 200 or more tokens,
//! so that the hunks are the same as the ones `difflib` reports.

use std::fmt::Write;

use hashbrown::{HashMap, HashSet};

/// Number of context lines around a change.
pub const CONTEXT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Equal,
    Replace,
    Delete,
    Insert,
}

impl Tag {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Equal => "  ",
            Self::Replace => "! ",
            Self::Delete => "- ",
            Self::Insert => "+ ",
        }
    }
}

type OpCode = (Tag, usize, usize, usize, usize);

struct SequenceMatcher<'a, T: AsRef<str>> {
    a: &'a [T],
    b: &'a [T],
    b2j: HashMap<&'a str, Vec<usize>>,
}

impl<'a, T: AsRef<str>> SequenceMatcher<'a, T> {
    fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<&str, Vec<usize>> = HashMap::new();
        for (j, elem) in b.iter().enumerate() {
            b2j.entry(elem.as_ref()).or_default().push(j);
        }

        let n = b.len();
        if n >= 200 {
            let ntest = n / 100 + 1;
            let popular: HashSet<&str> = b2j
                .iter()
                .filter(|(_, idxs)| idxs.len() > ntest)
                .map(|(elem, _)| *elem)
                .collect();

            for elem in popular {
                b2j.remove(elem);
            }
        }

        Self { a, b, b2j }
    }

    #[inline]
    fn a(&self, i: usize) -> &str {
        self.a[i].as_ref()
    }

    #[inline]
    fn b(&self, j: usize) -> &str {
        self.b[j].as_ref()
    }

    fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut newj2len = HashMap::new();
            if let Some(indices) = self.b2j.get(self.a(i)) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }

                    if j >= bhi {
                        break;
                    }

                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;

                    newj2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }

            j2len = newj2len;
        }

        while besti > alo
            && bestj > blo
            && self.a(besti - 1) == self.b(bestj - 1)
        {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }

        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a(besti + bestsize) == self.b(bestj + bestsize)
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    fn matching_blocks(&self) -> Vec<(usize, usize, usize)> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = vec![];

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k > 0 {
                blocks.push((i, j, k));
                if alo < i && blo < j {
                    queue.push((alo, i, blo, j));
                }

                if i + k < ahi && j + k < bhi {
                    queue.push((i + k, ahi, j + k, bhi));
                }
            }
        }

        blocks.sort_unstable();

        let mut result = vec![];
        let (mut i1, mut j1, mut k1) = (0, 0, 0);
        for (i2, j2, k2) in blocks {
            if i1 + k1 == i2 && j1 + k1 == j2 {
                k1 += k2;
            } else {
                if k1 > 0 {
                    result.push((i1, j1, k1));
                }

                (i1, j1, k1) = (i2, j2, k2);
            }
        }

        if k1 > 0 {
            result.push((i1, j1, k1));
        }

        result.push((la, lb, 0));
        result
    }

    fn opcodes(&self) -> Vec<OpCode> {
        let (mut i, mut j) = (0, 0);
        let mut codes = vec![];

        for (ai, bj, size) in self.matching_blocks() {
            let tag = if i < ai && j < bj {
                Some(Tag::Replace)
            } else if i < ai {
                Some(Tag::Delete)
            } else if j < bj {
                Some(Tag::Insert)
            } else {
                None
            };

            if let Some(tag) = tag {
                codes.push((tag, i, ai, j, bj));
            }

            (i, j) = (ai + size, bj + size);
            if size > 0 {
                codes.push((Tag::Equal, ai, i, bj, j));
            }
        }

        codes
    }

    fn grouped_opcodes(&self, n: usize) -> Vec<Vec<OpCode>> {
        let mut codes = self.opcodes();
        if codes.is_empty() {
            codes.push((Tag::Equal, 0, 1, 0, 1));
        }

        if let Some(first) = codes.first_mut() {
            if first.0 == Tag::Equal {
                let (tag, i1, i2, j1, j2) = *first;
                let i1 = i1.max(i2.saturating_sub(n));
                let j1 = j1.max(j2.saturating_sub(n));
                *first = (tag, i1, i2, j1, j2);
            }
        }

        if let Some(last) = codes.last_mut() {
            if last.0 == Tag::Equal {
                let (tag, i1, i2, j1, j2) = *last;
                *last = (tag, i1, i2.min(i1 + n), j1, j2.min(j1 + n));
            }
        }

        let mut groups = vec![];
        let mut group = vec![];

        for (tag, mut i1, i2, mut j1, j2) in codes {
            if tag == Tag::Equal && i2 - i1 > 2 * n {
                group.push((tag, i1, i2.min(i1 + n), j1, j2.min(j1 + n)));
                groups.push(std::mem::take(&mut group));
                i1 = i1.max(i2.saturating_sub(n));
                j1 = j1.max(j2.saturating_sub(n));
            }

            group.push((tag, i1, i2, j1, j2));
        }

        if !group.is_empty()
            && !(group.len() == 1 && group[0].0 == Tag::Equal)
        {
            groups.push(group);
        }

        groups
    }
}

fn format_range(start: usize, stop: usize) -> String {
    let mut beginning = start + 1;
    let length = stop - start;

    if length == 0 {
        beginning -= 1;
    }

    if length <= 1 {
        return beginning.to_string();
    }

    format!("{beginning},{}", beginning + length - 1)
}

/// Returns the context diff of two token sequences. Equal sequences
/// yield the empty string.
pub fn context_diff<T: AsRef<str>>(a: &[T], b: &[T]) -> String {
    let matcher = SequenceMatcher::new(a, b);
    let mut out = String::new();

    for (idx, group) in matcher.grouped_opcodes(CONTEXT).iter().enumerate() {
        if idx == 0 {
            out.push_str("*** \n--- \n");
        }

        let (first, last) = (group[0], group[group.len() - 1]);

        out.push_str("***************\n");
        let _ = writeln!(out, "*** {} ****", format_range(first.1, last.2));

        if group
            .iter()
            .any(|op| matches!(op.0, Tag::Replace | Tag::Delete))
        {
            for (tag, i1, i2, _, _) in group {
                if *tag != Tag::Insert {
                    for token in &a[*i1..*i2] {
                        let _ =
                            writeln!(out, "{}{}", tag.prefix(), token.as_ref());
                    }
                }
            }
        }

        let _ = writeln!(out, "--- {} ----", format_range(first.3, last.4));

        if group
            .iter()
            .any(|op| matches!(op.0, Tag::Replace | Tag::Insert))
        {
            for (tag, _, _, j1, j2) in group {
                if *tag != Tag::Delete {
                    for token in &b[*j1..*j2] {
                        let _ =
                            writeln!(out, "{}{}", tag.prefix(), token.as_ref());
                    }
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    #[test]
    fn equal_sequences() {
        let a = tokens("Ich gehe nach Hause");
        assert_eq!(context_diff(&a, &a), "");
        assert_eq!(context_diff::<&str>(&[], &[]), "");
    }

    #[test]
    fn replace_and_insert() {
        let a = tokens("Ich gehe nach Hause und esse Brot .");
        let b = tokens("Ich gehe nach Haus und esse ein Brot .");

        assert_eq!(
            context_diff(&a, &b),
            "*** \n--- \n***************\n*** 1,8 ****\n  Ich\n  gehe\n  \
             nach\n! Hause\n  und\n  esse\n  Brot\n  .\n--- 1,9 ----\n  \
             Ich\n  gehe\n  nach\n! Haus\n  und\n  esse\n+ ein\n  Brot\n  \
             .\n"
        );
    }

    #[test]
    fn multiple_hunks() {
        let a: Vec<String> = "abcdefghijklmnop".chars().map(String::from).collect();
        let b: Vec<String> = "abcXefghijklmnoY".chars().map(String::from).collect();

        let diff = context_diff(&a, &b);
        assert_eq!(diff.matches("***************\n").count(), 2);
        assert!(diff.contains("*** 1,7 ****\n"));
        assert!(diff.contains("*** 13,16 ****\n"));
        assert!(diff.contains("! d\n"));
        assert!(diff.ends_with("--- 13,16 ----\n  m\n  n\n  o\n! Y\n"));
    }

    #[test]
    fn insert_only() {
        let a = tokens("a b c");
        let b = tokens("a b c d");

        assert_eq!(
            context_diff(&a, &b),
            "*** \n--- \n***************\n*** 1,3 ****\n--- 1,4 ----\n  a\n  \
             b\n  c\n+ d\n"
        );
    }

    #[test]
    fn delete_all() {
        let a = tokens("a b c");
        assert_eq!(
            context_diff(&a, &[]),
            "*** \n--- \n***************\n*** 1,3 ****\n- a\n- b\n- c\n--- 0 \
             ----\n"
        );
    }

    #[test]
    fn ranges() {
        assert_eq!(format_range(0, 0), "0");
        assert_eq!(format_range(3, 4), "4");
        assert_eq!(format_range(3, 6), "4,6");
    }
}
