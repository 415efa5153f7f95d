use super::beachline::NodeIdx;
use super::{fortune_algorithm, voronoi, Diagram, EventId, Point, SiteIdx, VoronoiError};
use proptest::prelude::*;
use proptest::test_runner::TestRunner;
use rand::seq::SliceRandom;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() <= a.abs().max(b.abs()).max(1.0) * 1e-3
}

fn close_points(a: Point, b: Point) -> bool {
    close(a.x, b.x) && close(a.y, b.y)
}

fn points(points: &[(i32, i32)]) -> Vec<Point> {
    points
        .iter()
        .map(|&(x, y)| Point::new(x as f32, y as f32))
        .collect()
}

/// Number of points in the convex hull, not counting points in the middle of a hull edge.
fn hull_size(sites: &[Point]) -> usize {
    let mut pts: Vec<(f64, f64)> = sites.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    pts.sort_by(|a, b| a.partial_cmp(b).unwrap());
    pts.dedup();

    let cross = |o: (f64, f64), a: (f64, f64), b: (f64, f64)| {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    };

    let mut hull: Vec<(f64, f64)> = Vec::new();
    for pass in 0..2 {
        let start = hull.len();
        let iter: Box<dyn Iterator<Item = &(f64, f64)>> = if pass == 0 {
            Box::new(pts.iter())
        } else {
            Box::new(pts.iter().rev())
        };
        for &p in iter {
            while hull.len() >= start + 2 {
                let n = hull.len();
                if cross(hull[n - 2], hull[n - 1], p) > 0.0 {
                    break;
                }
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();
    }
    hull.len()
}

#[test]
fn single_site() {
    let diagram = voronoi(&[Point::new(3.0, 4.0)]).unwrap();
    assert!(diagram.is_empty());
    assert!(voronoi(&[]).unwrap().is_empty());
}

#[test]
fn two_sites() {
    let sites = points(&[(0, 0), (4, 0)]);
    let diagram = voronoi(&sites).unwrap();

    assert_eq!(diagram.len(), 2);
    for (i, edge) in diagram.edges().iter().enumerate() {
        assert_eq!(edge.start.x, 2.0);
        assert_eq!(edge.start.y, f32::NEG_INFINITY);
        assert!(!edge.has_bounded_start());
        assert_eq!(diagram.edge_end(i as u32), None);
    }
    assert_eq!(diagram.edge(0).twin, Some(1));
    assert_eq!(diagram.edge(1).twin, Some(0));
    assert_eq!(diagram.delaunay_edges(), vec![(0, 1)]);
}

#[test]
fn two_sites_vertical() {
    let sites = points(&[(0, 0), (0, 4)]);
    let diagram = voronoi(&sites).unwrap();

    assert_eq!(diagram.len(), 2);
    for edge in diagram.edges() {
        assert_eq!(edge.start, Point::new(0.0, 2.0));
    }
    // the two half edges run away from each other, along the bisector
    let d0 = diagram.edge(0).direction(&sites);
    let d1 = diagram.edge(1).direction(&sites);
    assert_eq!(d0.y, 0.0);
    assert_eq!(d0 + d1, Point::new(0.0, 0.0));
    assert!(diagram.vertices().is_empty());
}

#[test]
fn triangle() {
    let sites = points(&[(0, 0), (4, 0), (2, 3)]);
    let diagram = voronoi(&sites).unwrap();
    let v = Point::new(2.0, 5.0 / 6.0);

    debugln!("{:?}", diagram);

    let vertices = diagram.vertices();
    assert_eq!(vertices.len(), 1);
    assert!(close_points(vertices[0], v));

    // the bisector of the two bottom sites comes from infinity and ends at the vertex
    let bottom = diagram
        .edges()
        .iter()
        .position(|e| (e.left, e.right) == (0, 1))
        .unwrap();
    assert_eq!(diagram.edge(bottom as u32).start.y, f32::NEG_INFINITY);
    assert!(close_points(diagram.edge_end(bottom as u32).unwrap(), v));

    // every other edge starts at the vertex or is the twin of the bottom one
    for (i, edge) in diagram.edges().iter().enumerate() {
        if i == bottom || edge.twin == Some(bottom as u32) {
            continue;
        }
        assert!(close_points(edge.start, v));
        assert_eq!(diagram.edge_end(i as u32), None);
    }
    assert_eq!(diagram.delaunay_edges(), vec![(0, 1), (0, 2), (1, 2)]);
}

#[test]
fn beachline_evolution() {
    let sites = points(&[(0, 0), (4, 1), (2, 3)]);

    let mut expected_beachline: &[&[SiteIdx]] = &[
        &[0],             // first arc
        &[0, 1, 0],       // split by site 1
        &[0, 1, 2, 1, 0], // split by site 2
        &[0, 2, 1, 0],    // arc of site 1 between 0 and 2 collapses
    ];

    let diagram = fortune_algorithm(&sites, &mut |sweep, _, event| {
        let arcs = sweep.arcs().collect::<Vec<_>>();
        debugln!("{:?}: {:?}", event, arcs);
        assert_eq!(arcs, expected_beachline[0]);
        expected_beachline = &expected_beachline[1..];
    })
    .unwrap();

    assert!(expected_beachline.is_empty());
    assert_eq!(diagram.vertices().len(), 1);
}

#[test]
fn square_with_site_on_the_circle() {
    // the top site reaches the sweep line at the same time the circle event of the other three
    let sites = points(&[(1, 0), (-1, 0), (0, 1), (0, -1)]);
    let diagram = run_checked(&sites);
    let center = Point::new(0.0, 0.0);

    for i in 0..diagram.len() as u32 {
        if let Some(end) = diagram.edge_end(i) {
            assert!(close_points(end, center), "{:?}", end);
        }
    }
    assert_eq!(diagram.vertices().len(), 1);

    // four rays, one on each bisector of neighboring sites, all passing through the center
    let rays: Vec<u32> = (0..diagram.len() as u32)
        .filter(|&i| diagram.edge_end(i).is_none())
        .collect();
    assert_eq!(rays.len(), 4, "{:?}", diagram);
    let mut ray_pairs: Vec<(SiteIdx, SiteIdx)> = rays
        .iter()
        .map(|&i| {
            let e = diagram.edge(i);
            (e.left.min(e.right), e.left.max(e.right))
        })
        .collect();
    ray_pairs.sort_unstable();
    assert_eq!(ray_pairs, vec![(0, 2), (0, 3), (1, 2), (1, 3)]);
    for &(a, b) in &ray_pairs {
        let touches_center = (0..diagram.len() as u32).any(|i| {
            let e = diagram.edge(i);
            (e.left.min(e.right), e.left.max(e.right)) == (a, b)
                && (close_points(e.start, center)
                    || diagram.edge_end(i).is_some_and(|p| close_points(p, center)))
        });
        assert!(touches_center, "bisector of {} and {}", a, b);
    }

    // the site reaching the closing vertex leaves only a zero-length diagonal
    for i in 0..diagram.len() as u32 {
        let e = diagram.edge(i);
        if (e.left.min(e.right), e.left.max(e.right)) == (2, 3) {
            assert!(diagram.is_zero_length(i), "{:?}", e);
        }
    }
    assert_eq!(diagram.delaunay_edges(), vec![(0, 2), (0, 3), (1, 2), (1, 3)]);
}

#[test]
fn cocircular_square() {
    let sites = points(&[(0, 0), (2, 0), (0, 2), (2, 2)]);
    let diagram = run_checked(&sites);

    assert_eq!(diagram.vertices(), vec![Point::new(1.0, 1.0)]);
    // no diagonal: both arcs collapse on the same vertex
    assert_eq!(diagram.delaunay_edges(), vec![(0, 1), (0, 2), (1, 3), (2, 3)]);
}

#[test]
fn cocircular_twelve() {
    let sites = points(&[
        (5, 0),
        (4, 3),
        (3, 4),
        (0, 5),
        (-3, 4),
        (-4, 3),
        (-5, 0),
        (-4, -3),
        (-3, -4),
        (0, -5),
        (3, -4),
        (4, -3),
    ]);
    let diagram = run_checked(&sites);

    for i in 0..diagram.len() as u32 {
        if let Some(end) = diagram.edge_end(i) {
            assert!(close_points(end, Point::new(0.0, 0.0)), "{:?}", end);
        }
    }

    let pairs = diagram.delaunay_edges();
    for i in 0..12u32 {
        let j = (i + 1) % 12;
        let pair = (i.min(j), i.max(j));
        assert!(pairs.contains(&pair), "{:?} in {:?}", pair, pairs);
    }
}

#[test]
fn collinear_row() {
    let mut sites = points(&[(0, 0), (3, 0), (7, 0), (10, 0)]);
    sites.shuffle(&mut rand::thread_rng());
    let diagram = voronoi(&sites).unwrap();

    assert_eq!(diagram.len(), 6);
    let mut xs: Vec<f32> = diagram
        .edges()
        .iter()
        .map(|e| {
            assert_eq!(e.start.y, f32::NEG_INFINITY);
            e.start.x
        })
        .collect();
    xs.sort_by(f32::total_cmp);
    assert_eq!(xs, vec![1.5, 1.5, 5.0, 5.0, 8.5, 8.5]);
    assert!(diagram.vertices().is_empty());
    assert_eq!(diagram.delaunay_edges().len(), 3);
}

#[test]
fn collinear_vertical() {
    let sites = points(&[(0, 0), (0, 2), (0, 4), (0, 6)]);
    let diagram = voronoi(&sites).unwrap();

    // three horizontal bisectors, split in two half edges each
    assert_eq!(diagram.len(), 6);
    assert!(diagram.vertices().is_empty());
    let mut starts: Vec<f32> = diagram.edges().iter().map(|e| e.start.y).collect();
    starts.sort_by(f32::total_cmp);
    assert_eq!(starts, vec![1.0, 1.0, 3.0, 3.0, 5.0, 5.0]);
}

#[test]
fn duplicated_sites() {
    let sites = points(&[(1, 1), (1, 1), (3, 2)]);
    let diagram = voronoi(&sites).unwrap();

    assert_eq!(diagram.len(), 4);
    let collapsed = diagram
        .edges()
        .iter()
        .position(|e| (e.left, e.right) == (0, 1))
        .unwrap();
    assert_eq!(diagram.edge(collapsed as u32).start, sites[0]);
    assert_eq!(diagram.edge_end(collapsed as u32), Some(sites[0]));
    assert_eq!(diagram.delaunay_edges(), vec![(0, 2)]);
}

#[test]
fn nearly_duplicated_sites() {
    let sites = vec![
        Point::new(1.0, 1.0),
        Point::new(1.00001, 1.0),
        Point::new(3.0, 2.0),
    ];
    let diagram = voronoi(&sites).unwrap();
    assert_eq!(diagram.len(), 4);
}

#[test]
fn non_finite_site() {
    let sites = vec![Point::new(0.0, 0.0), Point::new(1.0, f32::INFINITY)];
    assert_eq!(
        voronoi(&sites).unwrap_err(),
        VoronoiError::NonFiniteSite {
            site: 1,
            point: sites[1]
        }
    );
    assert!(voronoi(&[Point::NAN]).is_err());
}

#[test]
fn parallel_diagrams() {
    let inputs: Vec<Vec<Point>> = (0..4)
        .map(|k| points(&[(0, 0), (4 + k, 1), (2, 3 + k), (-3, 5)]))
        .collect();
    let expected: Vec<Diagram> = inputs.iter().map(|s| voronoi(s).unwrap()).collect();

    let results: Vec<Diagram> = std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|sites| scope.spawn(move || voronoi(sites).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (a, b) in expected.iter().zip(&results) {
        assert_eq!(a.edges(), b.edges());
    }
}

/// Run the sweep, checking the invariants that hold between events.
fn run_checked(sites: &[Point]) -> Diagram {
    let mut ends: Vec<Point> = Vec::new();
    let mut circles: Vec<(NodeIdx, EventId)> = Vec::new();
    let mut directrix = f32::NEG_INFINITY;

    let diagram = fortune_algorithm(sites, &mut |sweep, id, event| {
        assert!(sweep.events().is_live(id), "dispatched a tombstoned event");

        // a circle event that left its arc, other than the one just handled, must be dead
        let now: Vec<(NodeIdx, EventId)> = sweep.circles().collect();
        for &(node, pending) in &circles {
            if pending != id && !now.contains(&(node, pending)) {
                assert!(
                    !sweep.events().is_live(pending),
                    "circle event {} of {:?} was dropped but is still queued",
                    pending,
                    node
                );
            }
        }
        circles = now;

        let y = event.pos(sites).y;
        assert!(y >= directrix - 1e-3 * directrix.abs().max(1.0), "{} after {}", y, directrix);
        directrix = directrix.max(y);
        assert_eq!(sweep.directrix(), y);

        // ends never move once resolved
        let now = sweep.edge_ends();
        for (before, after) in ends.iter().zip(now) {
            if !before.is_nan() {
                assert_eq!(before, after);
            }
        }
        ends.clear();
        ends.extend_from_slice(now);
    });

    match diagram {
        Ok(diagram) => diagram,
        Err(err) => panic!("{} for {:?}", err, sites),
    }
}

/// Every resolved point of an edge is equidistant to both of its sites.
fn check_equidistant(sites: &[Point], diagram: &Diagram, tolerance: f32) {
    let near = |a: f32, b: f32| (a - b).abs() <= a.abs().max(b.abs()).max(1.0) * tolerance;

    for (i, edge) in diagram.edges().iter().enumerate() {
        let l = sites[edge.left as usize];
        let r = sites[edge.right as usize];

        let end = diagram.edge_end(i as u32);
        if let Some(end) = end {
            assert!(end.is_finite());
        }

        for p in [Some(edge.start), end].into_iter().flatten() {
            if !p.is_finite() {
                continue;
            }
            assert!(near(p.dist(l), p.dist(r)), "edge {} {:?}: {:?}", i, edge, p);
        }
    }
}

fn diagram_fuzz_(points: Vec<(i32, i32)>) {
    let sites = self::points(&points);
    debugln!("{:?}", sites);

    let diagram = run_checked(&sites);
    check_equidistant(&sites, &diagram, 1e-3);
}

#[test]
fn diagram_fuzz() {
    let mut runner = TestRunner::default();

    let i = -5..6;
    let points = proptest::collection::vec((i.clone(), i), 0..12);

    runner
        .run(&points, |points| {
            diagram_fuzz_(points);
            Ok(())
        })
        .unwrap();
}

/// Test duplicated points
#[test]
fn diagram_fuzz_dup() {
    let mut runner = TestRunner::default();

    let i = 0..10i32;
    let points = proptest::collection::vec((i.clone(), i), 0..16);

    runner
        .run(&points, |points| {
            diagram_fuzz_(points);
            Ok(())
        })
        .unwrap();
}

#[test]
fn diagram_fuzz1() {
    diagram_fuzz_(vec![(4, 2), (0, 5), (0, 5), (0, 6)]);
}

#[test]
fn diagram_fuzz2() {
    diagram_fuzz_(vec![(7, 1), (9, 1), (8, 2), (8, 2)]);
}

#[test]
fn diagram_fuzz3() {
    diagram_fuzz_(vec![(90, 40), (90, 40), (90, 70), (90, 70), (0, 80)]);
}

#[test]
fn diagram_fuzz4() {
    diagram_fuzz_(vec![(0, 0), (4, 0), (2, 2), (6, 2)]);
}

#[test]
fn diagram_fuzz5() {
    diagram_fuzz_(vec![(15, -29), (7, -14), (21, -2), (0, 0)]);
}

#[test]
fn diagram_fuzz6() {
    diagram_fuzz_(vec![(0, 0), (1, 1), (2, 2), (3, 3), (0, 3), (3, 0)]);
}

#[test]
fn diagram_fuzz7() {
    // a grid: lots of rows, and four sites on every circle
    let grid = (0..4)
        .flat_map(|x| (0..4).map(move |y| (x, y)))
        .collect();
    diagram_fuzz_(grid);
}

proptest! {
    #[test]
    fn random_sites(sites in proptest::collection::vec((-100.0f32..100.0, -100.0f32..100.0), 3..40)) {
        let sites: Vec<Point> = sites.into_iter().map(|(x, y)| Point::new(x, y)).collect();
        let diagram = run_checked(&sites);
        check_equidistant(&sites, &diagram, 1e-2);

        // no site is closer to a vertex than the sites of the edges that meet there
        for (i, edge) in diagram.edges().iter().enumerate() {
            let Some(end) = diagram.edge_end(i as u32) else {
                continue;
            };
            let d = end.dist(sites[edge.left as usize]);
            for site in &sites {
                prop_assert!(end.dist(*site) >= d * (1.0 - 1e-2) - 1e-3);
            }
        }

        // each Delaunay edge found once, for a point set in general position
        let h = hull_size(&sites);
        prop_assume!(h >= 3);
        prop_assert_eq!(diagram.delaunay_edges().len(), 3 * sites.len() - 3 - h);
    }
}

#[test]
fn hull() {
    assert_eq!(hull_size(&points(&[(0, 0), (2, 0), (1, 1), (0, 2), (2, 2)])), 4);
    assert_eq!(hull_size(&points(&[(0, 0), (1, 0), (2, 0), (1, 2)])), 3);
}
