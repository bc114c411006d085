#![allow(dead_code)]

use geo_topology::{segment_index, Envelope2D, MultiPath};
use rstar::{RTree, RTreeObject, AABB};

struct BoxWithData<T>(AABB<[f64; 2]>, T);

impl<T> RTreeObject for BoxWithData<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.0
    }
}

fn aabb(env: &Envelope2D) -> AABB<[f64; 2]> {
    AABB::from_corners([env.xmin, env.ymin], [env.xmax, env.ymax])
}

fn segment_envelopes(mp: &MultiPath) -> Vec<Envelope2D> {
    mp.segments().map(|(_, line)| line.into()).collect()
}

pub fn count_quad_tree(red: &MultiPath, blue: &MultiPath, tolerance: f64) -> usize {
    let tree = segment_index::build_quad_tree(blue, 8);
    let mut iter = tree.iterator();
    let mut count = 0;
    for env in segment_envelopes(red) {
        iter.reset_iterator(env, tolerance);
        count += iter.by_ref().count();
    }
    count
}

pub fn count_intersector(red: &MultiPath, blue: &MultiPath, tolerance: f64) -> usize {
    let mut intersector = segment_index::segment_intersector(red, blue, tolerance);
    let mut count = 0;
    while intersector.next() {
        count += 1;
    }
    count
}

pub fn count_rtree(red: &MultiPath, blue: &MultiPath, tolerance: f64) -> usize {
    let blue: Vec<_> = segment_envelopes(blue)
        .iter()
        .enumerate()
        .map(|(i, env)| BoxWithData(aabb(env), i))
        .collect();
    let tree = RTree::bulk_load(blue);
    segment_envelopes(red)
        .iter()
        .map(|env| {
            tree.locate_in_envelope_intersecting(&aabb(&env.inflate(tolerance, tolerance)))
                .count()
        })
        .sum()
}
