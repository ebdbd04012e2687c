//! Axis-aligned rectangle shapes
//!
//! Each shape is centered on one entity, looked up by id at query time.

use std::collections::HashMap;

use glam::Vec2;
use rand::Rng;

use super::buffer::CopyFrom;
use super::entities::EntityStore;
use crate::error::SimError;

/// World-space bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_extent: Vec2) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStore {
    ids: Box<[u32]>,
    /// Owning entity id per shape
    centers: Box<[u32]>,
    half_extents: Box<[Vec2]>,
    count: usize,
    /// entity id -> row
    by_entity: HashMap<u32, usize>,
}

impl ShapeStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: vec![0; capacity].into_boxed_slice(),
            centers: vec![0; capacity].into_boxed_slice(),
            half_extents: vec![Vec2::ZERO; capacity].into_boxed_slice(),
            count: 0,
            by_entity: HashMap::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.ids.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Attach a new rectangle to an entity, returning the shape id
    pub fn add<R: Rng + ?Sized>(
        &mut self,
        entity_id: u32,
        half_extent: Vec2,
        rng: &mut R,
    ) -> Result<u32, SimError> {
        if self.count == self.capacity() {
            return Err(SimError::CapacityExhausted {
                store: "shape",
                capacity: self.capacity(),
            });
        }
        if self.by_entity.contains_key(&entity_id) {
            return Err(SimError::DuplicateId {
                store: "shape",
                id: entity_id,
            });
        }
        let row = self.count;
        let id = rng.random();
        self.ids[row] = id;
        self.centers[row] = entity_id;
        self.half_extents[row] = half_extent;
        self.by_entity.insert(entity_id, row);
        self.count += 1;
        Ok(id)
    }

    /// Shape id attached to an entity
    pub fn find_by_entity(&self, entity_id: u32) -> Option<u32> {
        self.by_entity.get(&entity_id).map(|&row| self.ids[row])
    }

    pub fn half_extent_of(&self, entity_id: u32) -> Option<Vec2> {
        self.by_entity
            .get(&entity_id)
            .map(|&row| self.half_extents[row])
    }

    /// Bounding box of an entity's shape at its current position
    pub fn aabb(&self, entity_id: u32, entities: &EntityStore) -> Option<Aabb> {
        let half = self.half_extent_of(entity_id)?;
        let center = entities.position(entity_id)?;
        Some(Aabb::from_center(center, half))
    }

    /// Entity id pairs whose shapes overlap, each pair reported once
    pub fn overlapping_pairs(&self, entities: &EntityStore) -> Vec<(u32, u32)> {
        let boxes: Vec<(u32, Aabb)> = self.centers[..self.count]
            .iter()
            .filter_map(|&id| self.aabb(id, entities).map(|b| (id, b)))
            .collect();

        let mut pairs = Vec::new();
        for (i, (a, box_a)) in boxes.iter().enumerate() {
            for (b, box_b) in &boxes[i + 1..] {
                if box_a.overlaps(box_b) {
                    pairs.push((*a, *b));
                }
            }
        }
        pairs
    }
}

impl CopyFrom for ShapeStore {
    fn copy_from(&mut self, other: &Self) {
        debug_assert_eq!(self.capacity(), other.capacity());
        let n = other.count;
        self.ids[..n].copy_from_slice(&other.ids[..n]);
        self.centers[..n].copy_from_slice(&other.centers[..n]);
        self.half_extents[..n].copy_from_slice(&other.half_extents[..n]);
        self.by_entity.clone_from(&other.by_entity);
        self.count = n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_aabb_follows_entity() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut entities = EntityStore::new(2);
        let mut shapes = ShapeStore::new(2);
        entities
            .add_entity(Vec2::new(0.5, 0.0), Vec2::ZERO, Vec2::ZERO, Some(10), &mut rng)
            .unwrap();
        shapes.add(10, Vec2::splat(0.25), &mut rng).unwrap();

        let aabb = shapes.aabb(10, &entities).unwrap();
        assert_eq!(aabb.min, Vec2::new(0.25, -0.25));
        assert_eq!(aabb.max, Vec2::new(0.75, 0.25));

        entities.set_position(10, Vec2::ZERO);
        assert_eq!(shapes.aabb(10, &entities).unwrap().max, Vec2::splat(0.25));
        assert!(shapes.find_by_entity(10).is_some());
        assert!(shapes.aabb(11, &entities).is_none());
    }

    #[test]
    fn test_overlapping_pairs() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut entities = EntityStore::new(3);
        let mut shapes = ShapeStore::new(3);
        for (id, x) in [(1, 0.0), (2, 0.3), (3, 0.9)] {
            entities
                .add_entity(Vec2::new(x, 0.0), Vec2::ZERO, Vec2::ZERO, Some(id), &mut rng)
                .unwrap();
            shapes.add(id, Vec2::splat(0.2), &mut rng).unwrap();
        }
        assert_eq!(shapes.overlapping_pairs(&entities), vec![(1, 2)]);
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Aabb::from_center(Vec2::ZERO, Vec2::splat(0.5));
        let b = Aabb::from_center(Vec2::new(1.0, 0.0), Vec2::splat(0.5));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_shape_capacity_exhausted() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut shapes = ShapeStore::new(1);
        shapes.add(1, Vec2::ONE, &mut rng).unwrap();
        assert!(matches!(
            shapes.add(2, Vec2::ONE, &mut rng),
            Err(SimError::CapacityExhausted { store: "shape", .. })
        ));
    }
}
