use std::collections::{HashMap, HashSet};

use crossword_csp::arc_consistency::all_arcs;
use crossword_csp::{
    establish_initial_consistency, find_fill, solve, Assignment, Crossword, Direction, Domains,
    FillFailure, SolverConfig, ValueOrdering, Variable, VariableOrdering,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a structure from rows where `.` is an open cell and `#` is a block.
fn structure(rows: &[&str]) -> Vec<Vec<bool>> {
    rows.iter().map(|row| row.trim().chars().map(|c| c == '.').collect()).collect()
}

/// Check an assignment by laying its words out on a grid, independently of the solver's own
/// consistency checks.
fn assert_valid_fill(crossword: &Crossword, assignment: &Assignment) {
    assert!(assignment.is_complete(), "assignment is incomplete");
    assert!(assignment.is_consistent(crossword));

    let mut letters: HashMap<(usize, usize), char> = HashMap::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (variable, word) in assignment.words(crossword) {
        assert!(seen.insert(word), "{word} used twice");
        assert_eq!(word.chars().count(), variable.length, "{word} doesn't fit {variable:?}");

        for (loc, c) in variable.cell_coords().into_iter().zip(word.chars()) {
            let existing = *letters.entry(loc).or_insert(c);
            assert_eq!(existing, c, "conflict at {loc:?}");
        }
    }
}

fn all_configs() -> Vec<SolverConfig> {
    let mut configs = vec![];
    for variable_ordering in [VariableOrdering::MinimumRemainingValues, VariableOrdering::Declaration] {
        for value_ordering in [ValueOrdering::LeastConstraining, ValueOrdering::Vocabulary] {
            for maintain_arc_consistency in [true, false] {
                configs.push(SolverConfig {
                    variable_ordering,
                    value_ordering,
                    maintain_arc_consistency,
                    state_limit: None,
                });
            }
        }
    }
    configs
}

#[test]
fn test_crossing_pair_rejects_duplicates() {
    init_logging();
    let crossword = Crossword::new(
        vec![
            Variable::new(1, 0, Direction::Across, 3),
            Variable::new(0, 1, Direction::Down, 3),
        ],
        ["cat", "dog", "cog"],
    )
    .unwrap();

    let assignment = solve(&crossword).expect("Failed to find a fill");

    assert_valid_fill(&crossword, &assignment);
    let mut words: Vec<_> = assignment.words(&crossword).into_iter().map(|(_, word)| word).collect();
    words.sort_unstable();
    assert_eq!(words, vec!["cog", "dog"]);
}

#[test]
fn test_single_variable() {
    init_logging();
    let crossword = Crossword::new(
        vec![Variable::new(0, 0, Direction::Across, 4)],
        ["cat", "tree", "dog", "elephant"],
    )
    .unwrap();

    let assignment = solve(&crossword).expect("Failed to find a fill");

    assert_eq!(assignment.word(&crossword, 0), Some("tree"));
}

#[test]
fn test_unique_solution() {
    init_logging();
    let crossword = Crossword::new(
        vec![
            Variable::new(0, 0, Direction::Across, 3),
            Variable::new(0, 0, Direction::Down, 4),
        ],
        ["cat", "dog", "tree", "cart"],
    )
    .unwrap();

    for config in all_configs() {
        let result = find_fill(&crossword, &config).expect("Failed to find a fill");
        assert_eq!(result.assignment.word(&crossword, 0), Some("cat"));
        assert_eq!(result.assignment.word(&crossword, 1), Some("cart"));
    }
}

#[test]
fn test_ring_has_two_solutions() {
    init_logging();
    let crossword = Crossword::from_structure(
        &structure(&[
            "...",
            ".#.",
            "...",
        ]),
        ["cat", "cow", "toe", "woe", "dog", "ant", "bee"],
    )
    .unwrap();
    let expected: [[&str; 4]; 2] = [["cat", "woe", "cow", "toe"], ["cow", "toe", "cat", "woe"]];

    for config in all_configs() {
        let result = find_fill(&crossword, &config).expect("Failed to find a fill");
        assert_valid_fill(&crossword, &result.assignment);

        let words: Vec<_> =
            (0..4).map(|v| result.assignment.word(&crossword, v).unwrap()).collect();
        assert!(expected.iter().any(|solution| solution[..] == words[..]), "{words:?}");
    }
}

#[test]
fn test_find_fill_for_4x4_square() {
    init_logging();
    let crossword = Crossword::from_structure(
        &structure(&[
            "....",
            "....",
            "....",
            "....",
        ]),
        [
            "abcd", "efgh", "ijkl", "mnop", "aeim", "bfjn", "cgko", "dhlp",
            "abce", "aeix", "zzzz", "mnoq", "bfjm", "dhlq", "efgi", "cgkp",
        ],
    )
    .unwrap();
    assert_eq!(crossword.variable_count(), 8);

    for config in all_configs() {
        let result = find_fill(&crossword, &config).expect("Failed to find a fill");
        println!("{:?}", result.statistics);
        assert_valid_fill(&crossword, &result.assignment);
    }
}

#[test]
fn test_propagation_alone_detects_conflict() {
    init_logging();
    let crossword = Crossword::new(
        vec![
            Variable::new(0, 0, Direction::Across, 3),
            Variable::new(0, 0, Direction::Down, 4),
        ],
        ["cat", "dog", "tree", "bark"],
    )
    .unwrap();

    let failure = establish_initial_consistency(&crossword).unwrap_err();
    assert!(matches!(failure, FillFailure::ArcInconsistent { .. }));

    let result = find_fill(&crossword, &SolverConfig::default());
    assert_eq!(result.unwrap_err(), failure);
    assert!(solve(&crossword).is_none());
}

#[test]
fn test_no_word_of_required_length() {
    init_logging();
    let crossword = Crossword::new(
        vec![
            Variable::new(0, 0, Direction::Across, 3),
            Variable::new(2, 0, Direction::Across, 5),
        ],
        ["cat", "dog", "tree"],
    )
    .unwrap();

    let failure = find_fill(&crossword, &SolverConfig::default()).unwrap_err();

    assert_eq!(failure, FillFailure::EmptyDomain { variable_id: 1 });
    assert!(failure.is_unsatisfiable());
}

#[test]
fn test_fill_fails_gracefully() {
    init_logging();
    // Every overlap can be satisfied pairwise, but there aren't enough distinct words.
    let crossword = Crossword::from_structure(
        &structure(&[
            "...",
            ".#.",
            "...",
        ]),
        ["aaa", "aba"],
    )
    .unwrap();

    assert!(establish_initial_consistency(&crossword).is_ok());
    for config in all_configs() {
        assert_eq!(find_fill(&crossword, &config).unwrap_err(), FillFailure::Exhausted);
    }
}

#[test]
fn test_initial_consistency_holds_for_every_arc() {
    init_logging();
    // One fill is "cats", "we", "whoa" across and "cow", "two", "sea" down.
    let crossword = Crossword::from_structure(
        &structure(&[
            "....",
            ".#..",
            "....",
        ]),
        [
            "cats", "we", "whoa", "cow", "two", "sea", "cots", "moat", "toe", "sex", "ox", "be",
            "oe", "tee", "coat",
        ],
    )
    .unwrap();

    let domains = establish_initial_consistency(&crossword).expect("Puzzle should be consistent");
    let unpruned = Domains::new(&crossword);

    for variable_id in 0..crossword.variable_count() {
        let length = crossword.variable(variable_id).length;
        assert!(domains.words_of(&crossword, variable_id).all(|w| w.chars().count() == length));
        assert!(domains.domain_of(variable_id).is_subset(unpruned.domain_of(variable_id)));
    }
    assert!(domains.total_len() < unpruned.total_len());

    for (x, y) in all_arcs(&crossword) {
        let overlap = crossword.overlap(x, y).unwrap();
        for x_word in domains.domain_of(x) {
            let glyph = crossword.word(x_word).glyphs[overlap.index];
            assert!(domains
                .domain_of(y)
                .iter()
                .any(|y_word| crossword.word(y_word).glyphs[overlap.other_index] == glyph));
        }
    }

    let assignment = solve(&crossword).expect("Failed to find a fill");
    assert_valid_fill(&crossword, &assignment);
}

#[test]
fn test_solving_is_deterministic() {
    init_logging();
    let crossword = Crossword::from_structure(
        &structure(&[
            "....",
            "....",
            "....",
            "....",
        ]),
        [
            "abcd", "efgh", "ijkl", "mnop", "aeim", "bfjn", "cgko", "dhlp",
            "abce", "aeix", "zzzz", "mnoq", "bfjm", "dhlq",
        ],
    )
    .unwrap();

    let first = solve(&crossword).expect("Failed to find a fill");
    let second = solve(&crossword).expect("Failed to find a fill");

    assert_eq!(first, second);
    assert_valid_fill(&crossword, &first);
}
