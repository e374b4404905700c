// FIRST and FOLLOW sets over the dense encoding of `Rewrite`.
//
// Sets hold dense symbol indices. In FIRST sets the `epsilon` terminal marks
// nullability.

use std::collections::BTreeSet;

/// FIRST of the sequence `seq`.
///
/// Accumulates FIRST of each symbol minus `epsilon`, stopping at the first
/// symbol that is not nullable. `epsilon` is included iff every symbol is
/// nullable (in particular for the empty sequence).
pub fn first_of_sequence(seq: &[usize], first: &[BTreeSet<usize>], epsilon: usize) -> BTreeSet<usize> {
    let mut out = BTreeSet::new();
    for &sym in seq {
        let f = &first[sym];
        out.extend(f.iter().copied().filter(|&t| t != epsilon));
        if !f.contains(&epsilon) {
            return out;
        }
    }
    out.insert(epsilon);
    out
}

/// Computes FIRST sets for all symbols by fixpoint iteration.
///
/// # Parameters
/// - `prods`: productions as `[lhs, rhs...]`.
/// - `n_nonterm`, `n_term`: sizes of the two halves of the symbol space.
/// - `epsilon`: dense index of the empty-string terminal.
pub fn first_sets(
    prods: &[Vec<usize>],
    n_nonterm: usize,
    n_term: usize,
    epsilon: usize,
) -> Vec<BTreeSet<usize>> {
    let n_sym = n_nonterm + n_term;
    let mut first: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n_sym];
    for (t, set) in first.iter_mut().enumerate().skip(n_nonterm) {
        set.insert(t);
    }
    let mut changed = true;
    while changed {
        changed = false;
        for prod in prods {
            let lhs = prod[0];
            let f = first_of_sequence(&prod[1..], &first, epsilon);
            for t in f {
                if first[lhs].insert(t) {
                    changed = true;
                }
            }
        }
    }
    first
}

/// Computes FOLLOW sets for all nonterminals by fixpoint iteration.
///
/// `FOLLOW(start)` is seeded with `eof`. Each production is scanned right to
/// left with a trailer holding what may follow the current position.
pub fn follow_sets(
    prods: &[Vec<usize>],
    n_nonterm: usize,
    start: usize,
    first: &[BTreeSet<usize>],
    epsilon: usize,
    eof: usize,
) -> Vec<BTreeSet<usize>> {
    let mut follow: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n_nonterm];
    follow[start].insert(eof);
    let mut changed = true;
    while changed {
        changed = false;
        for prod in prods {
            let lhs = prod[0];
            let mut trailer = follow[lhs].clone();
            for &sym in prod[1..].iter().rev() {
                let first_sym = first[sym].iter().copied().filter(|&t| t != epsilon);
                if sym < n_nonterm {
                    for &t in &trailer {
                        if follow[sym].insert(t) {
                            changed = true;
                        }
                    }
                    if first[sym].contains(&epsilon) {
                        trailer.extend(first_sym);
                    } else {
                        trailer = first_sym.collect();
                    }
                } else {
                    trailer = first_sym.collect();
                }
            }
        }
    }
    follow
}

#[cfg(test)]
mod tests {
    use super::*;

    // Goal'=0 E=1 T=2 | eps=3 eof=4 +=5 id=6
    fn expr() -> Vec<Vec<usize>> {
        vec![vec![0, 1], vec![1, 1, 5, 2], vec![1, 2], vec![2, 6]]
    }

    #[test]
    fn first_of_expression_grammar() {
        let first = first_sets(&expr(), 3, 4, 3);
        assert_eq!(first[1], BTreeSet::from([6]));
        assert_eq!(first[2], BTreeSet::from([6]));
        assert_eq!(first[0], BTreeSet::from([6]));
        assert_eq!(first[5], BTreeSet::from([5]));
    }

    #[test]
    fn follow_of_expression_grammar() {
        let prods = expr();
        let first = first_sets(&prods, 3, 4, 3);
        let follow = follow_sets(&prods, 3, 0, &first, 3, 4);
        assert_eq!(follow[1], BTreeSet::from([4, 5]));
        assert_eq!(follow[2], BTreeSet::from([4, 5]));
    }

    #[test]
    fn nullable_prefixes() {
        // Goal'=0 S=1 A=2 B=3 | eps=4 eof=5 a=6 b=7 c=8
        // S -> A B c, A -> a | , B -> b |
        let prods = vec![
            vec![0, 1],
            vec![1, 2, 3, 8],
            vec![2, 6],
            vec![2],
            vec![3, 7],
            vec![3],
        ];
        let first = first_sets(&prods, 4, 5, 4);
        assert_eq!(first[2], BTreeSet::from([4, 6]));
        assert_eq!(first[1], BTreeSet::from([6, 7, 8]));
        assert_eq!(first_of_sequence(&[2, 3], &first, 4), BTreeSet::from([4, 6, 7]));
        assert_eq!(first_of_sequence(&[], &first, 4), BTreeSet::from([4]));

        let follow = follow_sets(&prods, 4, 0, &first, 4, 5);
        assert_eq!(follow[2], BTreeSet::from([7, 8]));
        assert_eq!(follow[3], BTreeSet::from([8]));
        assert_eq!(follow[1], BTreeSet::from([5]));
    }
}
