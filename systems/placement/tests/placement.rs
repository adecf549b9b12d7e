use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use stimulus_grid_core::{compute_cell_size, CellCoord, CellSize};
use stimulus_grid_system_placement::{select_free_cell, Config, Placement};
use stimulus_grid_world::{create_grid, query, reset_grid, Grid};

fn standard_grid() -> Grid {
    create_grid(11, 6).expect("valid dimensions")
}

fn standard_cell_size() -> CellSize {
    compute_cell_size(1920.0, 1080.0, 11, 6).expect("valid display")
}

#[test]
fn selection_occupies_a_previously_free_cell() {
    let mut grid = standard_grid();
    let mut placement = Placement::new(Config::new(3));
    let free_before = query::free_cell_count(&grid);

    let cell = placement
        .select_and_occupy(&mut grid)
        .expect("fresh grid has free cells");

    assert!(!query::dimensions(&grid).is_reserved(cell));
    assert!(query::is_occupied(&grid, cell));
    assert!(query::free_cell_count(&grid) < free_before);
}

#[test]
fn repeated_selection_until_exhaustion_never_reuses_a_cell() {
    let mut grid = standard_grid();
    let mut placement = Placement::new(Config::new(11));
    let mut selected = HashSet::new();
    let mut free = query::free_cell_count(&grid);

    while let Some(cell) = placement.select_and_occupy(&mut grid) {
        assert!(selected.insert(cell), "cell {cell:?} selected twice");
        let remaining = query::free_cell_count(&grid);
        assert!(remaining < free, "free cell count must strictly decrease");
        free = remaining;
    }

    assert_eq!(query::free_cell_count(&grid), 0);
    assert!(placement.select_and_occupy(&mut grid).is_none());
    assert!(!selected.is_empty());
}

#[test]
fn selected_cells_never_share_an_exclusion_neighbourhood() {
    for seed in 0..20 {
        let mut grid = standard_grid();
        let mut placement = Placement::new(Config::new(seed));
        let mut selected: Vec<CellCoord> = Vec::new();

        while let Some(cell) = placement.select_and_occupy(&mut grid) {
            selected.push(cell);
        }

        for (index, first) in selected.iter().enumerate() {
            for second in &selected[index + 1..] {
                assert!(
                    !stimulus_grid_core::in_exclusion_zone(*first, *second),
                    "seed {seed}: {first:?} and {second:?} are too close"
                );
            }
        }
    }
}

#[test]
fn generation_stops_early_when_grid_is_full() {
    let mut grid = standard_grid();
    let mut placement = Placement::new(Config::new(42));
    let requested = 64;

    let stimuli = placement.generate_stimuli(&mut grid, requested, standard_cell_size());

    assert!(stimuli.len() < requested);
    assert!(!stimuli.is_empty());
    let cells: HashSet<CellCoord> = stimuli.iter().map(|stimulus| stimulus.cell).collect();
    assert_eq!(cells.len(), stimuli.len(), "no cell may host two stimuli");
    assert_eq!(query::free_cell_count(&grid), 0);
}

#[test]
fn generation_never_exceeds_requested_count() {
    for requested in 0..6 {
        let mut grid = standard_grid();
        let mut placement = Placement::new(Config::new(requested as u64));
        let stimuli = placement.generate_stimuli(&mut grid, requested, standard_cell_size());
        assert!(stimuli.len() <= requested);
    }

    let mut grid = standard_grid();
    let mut placement = Placement::new(Config::new(5));
    assert_eq!(
        placement
            .generate_stimuli(&mut grid, 1, standard_cell_size())
            .len(),
        1
    );
}

#[test]
fn stimuli_are_centred_in_their_cells_and_inside_the_display() {
    let size = standard_cell_size();
    let mut grid = standard_grid();
    let mut placement = Placement::new(Config::new(9));

    let stimuli = placement.generate_stimuli(&mut grid, 8, size);

    for stimulus in &stimuli {
        let column = stimulus.cell.column() as f32;
        let row = stimulus.cell.row() as f32;
        assert!((stimulus.center_x - (column * size.width() + size.width() / 2.0)).abs() < 1e-3);
        assert!((stimulus.center_y - (row * size.height() + size.height() / 2.0)).abs() < 1e-3);
        assert!(stimulus.center_x > 0.0 && stimulus.center_x < 1920.0);
        assert!(stimulus.center_y > 0.0 && stimulus.center_y < 1080.0);
        assert!((stimulus.radius - size.width().min(size.height()) / 4.0).abs() < 1e-4);
        assert_eq!(stimulus.label, stimulus.cell.label());
    }
}

#[test]
fn same_seed_replays_identical_layout() {
    let run = |seed: u64| {
        let mut grid = standard_grid();
        let mut placement = Placement::new(Config::new(seed));
        let first = placement.generate_stimuli(&mut grid, 4, standard_cell_size());
        reset_grid(&mut grid);
        let second = placement.generate_stimuli(&mut grid, 4, standard_cell_size());
        (first, second, grid)
    };

    assert_eq!(run(2024), run(2024));
}

#[test]
fn injected_generator_matches_seeded_constructor() {
    let mut seeded_grid = standard_grid();
    let mut injected_grid = standard_grid();
    let mut seeded = Placement::new(Config::new(77));
    let mut injected = Placement::with_rng(ChaCha8Rng::seed_from_u64(77));

    assert_eq!(
        seeded.generate_stimuli(&mut seeded_grid, 5, standard_cell_size()),
        injected.generate_stimuli(&mut injected_grid, 5, standard_cell_size())
    );
}

#[test]
fn selection_is_uniform_over_free_cells() {
    let grid = create_grid(5, 4).expect("valid dimensions");
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let mut counts: HashMap<CellCoord, u32> = HashMap::new();
    let draws = 4_000;

    for _ in 0..draws {
        let cell = select_free_cell(query::occupancy_view(&grid), &mut rng)
            .expect("grid has free cells");
        *counts.entry(cell).or_default() += 1;
    }

    assert_eq!(counts.len(), 4);
    for (cell, count) in counts {
        assert!(
            (850..=1_150).contains(&count),
            "{cell:?} drawn {count} times out of {draws}"
        );
    }
}

#[test]
fn selection_reports_none_when_no_cell_is_free() {
    let grid = create_grid(3, 3).expect("valid dimensions");
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    assert_eq!(query::free_cell_count(&grid), 0);
    assert_eq!(select_free_cell(query::occupancy_view(&grid), &mut rng), None);
}
