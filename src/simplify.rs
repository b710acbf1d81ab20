// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Position, Repository};

/// Checks whether the straight grid line between two positions is unobstructed.
///
/// The line is walked with Bresenham's algorithm, and every cell strictly between
/// the endpoints must be free. The endpoints themselves are not checked, so a
/// blocked cell can still be seen (and see) across free cells. Positions on
/// different grids never see each other, while positions at most one cell apart
/// (including diagonally) always do.
///
/// The endpoints are put in a canonical order before walking the line,
/// so `line_of_sight(a, b) == line_of_sight(b, a)`.
pub fn line_of_sight(repo: &Repository, a: &Position, b: &Position) -> bool {
    if !a.same_map(b) {
        return false;
    }

    let grid = match repo.grid(a) {
        Some(g) => g,
        None => return false,
    };

    let ((r1, c1), (r2, c2)) = if (a.row, a.col) <= (b.row, b.col) {
        ((a.row, a.col), (b.row, b.col))
    } else {
        ((b.row, b.col), (a.row, a.col))
    };

    let dr = r1.abs_diff(r2) as i64;
    let dc = c1.abs_diff(c2) as i64;
    if dr <= 1 && dc <= 1 {
        return true;
    }

    let step_r = if r1 < r2 { 1 } else { -1 };
    let step_c = if c1 < c2 { 1 } else { -1 };

    // Major and minor axis, with the error term kept doubled to stay in integers
    let (major, minor) = if dr >= dc { (dr, dc) } else { (dc, dr) };
    let mut err = major;
    let (mut r, mut c) = (r1, c1);

    for _ in 1..major {
        err -= 2 * minor;
        let minor_step = err < 0;
        if minor_step {
            err += 2 * major;
        }

        if dr >= dc {
            r += step_r;
            if minor_step {
                c += step_c;
            }
        } else {
            c += step_c;
            if minor_step {
                r += step_r;
            }
        }

        if !grid.is_free(r, c) {
            return false;
        }
    }

    true
}

/// Prunes a cell-by-cell path into waypoints.
///
/// Points on either side of a floor or building change are always kept, as are
/// the first and the last point. Between those, a segment is greedily extended
/// while its start still has [line of sight](line_of_sight) to the next cell;
/// once that breaks, the current cell becomes a waypoint and starts a new segment.
///
/// The result is always a subsequence of the input.
pub fn simplify_path(repo: &Repository, path: &[Position]) -> Vec<Position> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let mut waypoints = vec![path[0].clone()];
    let mut segment_start = 0;

    for i in 1..path.len() - 1 {
        let transition = !path[i - 1].same_map(&path[i]) || !path[i].same_map(&path[i + 1]);
        if transition || !line_of_sight(repo, &path[segment_start], &path[i + 1]) {
            waypoints.push(path[i].clone());
            segment_start = i;
        }
    }

    waypoints.push(path[path.len() - 1].clone());
    waypoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{building, open_floor, repository};
    use crate::{find_raw_path, Portal};

    fn is_subsequence(sub: &[Position], of: &[Position]) -> bool {
        let mut it = of.iter();
        sub.iter().all(|p| it.any(|q| q == p))
    }

    fn pillar_repo() -> Repository {
        repository([building(
            "ne01",
            &[
                (
                    1,
                    "
                    .......
                    .......
                    ...#...
                    .......
                    .......
                    ",
                ),
                (2, open_floor(5).as_str()),
            ],
        )])
    }

    #[test]
    fn line_of_sight_open() {
        let repo = pillar_repo();
        let a = Position::new("ne01", 1, 0, 0);
        let b = Position::new("ne01", 1, 1, 6);
        assert!(line_of_sight(&repo, &a, &b));
        assert!(line_of_sight(&repo, &b, &a));
    }

    #[test]
    fn line_of_sight_blocked() {
        let repo = pillar_repo();
        let a = Position::new("ne01", 1, 2, 0);
        let b = Position::new("ne01", 1, 2, 6);
        assert!(!line_of_sight(&repo, &a, &b));
        assert!(!line_of_sight(&repo, &b, &a));

        let a = Position::new("ne01", 1, 0, 1);
        let b = Position::new("ne01", 1, 4, 5);
        assert!(!line_of_sight(&repo, &a, &b));
    }

    #[test]
    fn line_of_sight_adjacent() {
        let repo = pillar_repo();
        let blocked = Position::new("ne01", 1, 2, 3);
        assert!(line_of_sight(&repo, &blocked, &Position::new("ne01", 1, 1, 2)));
        assert!(line_of_sight(&repo, &blocked, &Position::new("ne01", 1, 2, 4)));
    }

    #[test]
    fn line_of_sight_ignores_blocked_endpoints() {
        let repo = pillar_repo();
        let pillar = Position::new("ne01", 1, 2, 3);
        let a = Position::new("ne01", 1, 2, 0);
        assert!(!repo.is_free(&pillar));
        assert!(line_of_sight(&repo, &a, &pillar));
        assert!(line_of_sight(&repo, &pillar, &a));
    }

    #[test]
    fn line_of_sight_different_maps() {
        let repo = pillar_repo();
        let a = Position::new("ne01", 1, 0, 0);
        let b = Position::new("ne01", 2, 0, 0);
        assert!(!line_of_sight(&repo, &a, &b));
    }

    #[test]
    fn line_of_sight_is_symmetric() {
        let repo = repository([building(
            "ne01",
            &[(
                1,
                "
                ..#....
                ....#..
                .#.....
                ...#..#
                #......
                ",
            )],
        )]);

        for r1 in 0..5 {
            for c1 in 0..7 {
                for r2 in 0..5 {
                    for c2 in 0..7 {
                        let a = Position::new("ne01", 1, r1, c1);
                        let b = Position::new("ne01", 1, r2, c2);
                        assert_eq!(
                            line_of_sight(&repo, &a, &b),
                            line_of_sight(&repo, &b, &a),
                            "{} <-> {}",
                            a,
                            b
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn open_floor_diagonal() {
        let repo = repository([building("ne01", &[(0, open_floor(10).as_str())])]);
        let from = Position::new("ne01", 0, 0, 0);
        let to = Position::new("ne01", 0, 9, 9);

        let raw = find_raw_path(&repo, &from, &to, 1000).unwrap();
        assert_eq!(raw.len(), 19);
        assert_eq!(simplify_path(&repo, &raw), vec![from, to]);
    }

    #[test]
    fn turns_around_corner() {
        let repo = repository([building(
            "ne01",
            &[(
                1,
                "
                ....
                ###.
                ###.
                ",
            )],
        )]);
        let raw: Vec<Position> = [(0, 0), (0, 1), (0, 2), (0, 3), (1, 3), (2, 3)]
            .iter()
            .map(|&(r, c)| Position::new("ne01", 1, r, c))
            .collect();

        assert_eq!(
            simplify_path(&repo, &raw),
            vec![
                Position::new("ne01", 1, 0, 0),
                Position::new("ne01", 1, 0, 3),
                Position::new("ne01", 1, 2, 3),
            ]
        );
    }

    #[test]
    fn keeps_transitions() {
        let mut a = building("ne01", &[(1, open_floor(4).as_str()), (2, open_floor(4).as_str())]);
        a.add_stair("A", 1, 0, 3);
        a.add_stair("A", 2, 0, 3);
        a.add_entrance("entrance a", 2, 3, 3);
        a.add_portal(2, Portal::new("entrance a", "entrance b", "ne02", 1));
        let mut b = building("ne02", &[(1, open_floor(4).as_str())]);
        b.add_entrance("entrance b", 1, 0, 0);
        let repo = repository([a, b]);

        let from = Position::new("ne01", 1, 0, 0);
        let to = Position::new("ne02", 1, 3, 3);
        let raw = find_raw_path(&repo, &from, &to, 10_000).unwrap();
        let simplified = simplify_path(&repo, &raw);

        assert!(is_subsequence(&simplified, &raw));
        assert_eq!(simplified.first(), Some(&from));
        assert_eq!(simplified.last(), Some(&to));
        for pair in raw.windows(2) {
            if !pair[0].same_map(&pair[1]) {
                assert!(simplified.contains(&pair[0]), "lost {}", pair[0]);
                assert!(simplified.contains(&pair[1]), "lost {}", pair[1]);
            }
        }

        assert_eq!(
            simplified,
            vec![
                from,
                Position::new("ne01", 1, 0, 3),
                Position::new("ne01", 2, 0, 3),
                Position::new("ne01", 2, 3, 3),
                Position::new("ne02", 1, 0, 0),
                to,
            ]
        );
    }

    #[test]
    fn keeps_transitions_back_to_same_floor() {
        let mut b = building("ne01", &[(1, ".#\n#."), (2, ".")]);
        b.add_stair("A", 1, 0, 0);
        b.add_stair("A", 2, 0, 0);
        b.add_stair("B", 1, 1, 1);
        b.add_stair("B", 2, 0, 0);
        let repo = repository([b]);

        let from = Position::new("ne01", 1, 0, 0);
        let to = Position::new("ne01", 1, 1, 1);
        let raw = find_raw_path(&repo, &from, &to, 1000).unwrap();
        assert_eq!(raw, vec![from.clone(), Position::new("ne01", 2, 0, 0), to.clone()]);
        assert_eq!(simplify_path(&repo, &raw), raw);
    }

    #[test]
    fn keeps_landing_before_straight_run() {
        let repo = repository([building(
            "ne01",
            &[(1, open_floor(4).as_str()), (2, open_floor(4).as_str())],
        )]);
        let path = vec![
            Position::new("ne01", 1, 0, 0),
            Position::new("ne01", 2, 0, 0),
            Position::new("ne01", 1, 0, 1),
            Position::new("ne01", 1, 0, 2),
            Position::new("ne01", 1, 0, 3),
        ];

        assert_eq!(
            simplify_path(&repo, &path),
            vec![
                Position::new("ne01", 1, 0, 0),
                Position::new("ne01", 2, 0, 0),
                Position::new("ne01", 1, 0, 1),
                Position::new("ne01", 1, 0, 3),
            ]
        );
    }

    #[test]
    fn short_paths() {
        let repo = pillar_repo();
        assert!(simplify_path(&repo, &[]).is_empty());
        let one = vec![Position::new("ne01", 1, 0, 0)];
        assert_eq!(simplify_path(&repo, &one), one);
    }
}
