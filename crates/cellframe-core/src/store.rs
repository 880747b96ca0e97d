//! In-memory scene graph: the only write path for projects, scenes, frames
//! and elements.
//!
//! Every mutation is synchronous, bumps `updated_at` on the touched entities
//! and marks the owning project dirty for the autosave manager.

use crate::error::{EditorError, EditorResult, EntityKind};
use crate::model::{
    Element, ElementId, Frame, FrameId, FrameOptions, FramePatch, Project, ProjectId,
    ProjectOptions, ProjectPatch, Scene, SceneId, SceneOptions, ScenePatch,
};
use log::{debug, info, warn};
use std::collections::HashSet;

/// Most recently opened projects remembered.
pub const MAX_RECENT_PROJECTS: usize = 10;

/// Position of a frame inside the graph: (project, scene, frame) indices.
type FrameSlot = (usize, usize, usize);

#[derive(Debug, Default)]
pub struct SceneGraph {
    projects: Vec<Project>,
    active_project: Option<ProjectId>,
    recent: Vec<ProjectId>,
    dirty: HashSet<ProjectId>,
    revision: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self, project_id: ProjectId) -> bool {
        self.dirty.contains(&project_id)
    }

    pub fn dirty_projects(&self) -> impl Iterator<Item = ProjectId> + '_ {
        self.dirty.iter().copied()
    }

    /// Clear the dirty mark once the project has been persisted.
    pub fn mark_saved(&mut self, project_id: ProjectId) {
        self.dirty.remove(&project_id);
    }

    // --- lookup ---

    fn project_index(&self, id: ProjectId) -> EditorResult<usize> {
        self.projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Project, id))
    }

    fn scene_slot(&self, id: SceneId) -> EditorResult<(usize, usize)> {
        self.projects
            .iter()
            .enumerate()
            .find_map(|(pi, p)| {
                p.scenes
                    .iter()
                    .position(|s| s.id == id)
                    .map(|si| (pi, si))
            })
            .ok_or_else(|| EditorError::not_found(EntityKind::Scene, id))
    }

    fn frame_slot(&self, id: FrameId) -> EditorResult<FrameSlot> {
        for (pi, project) in self.projects.iter().enumerate() {
            for (si, scene) in project.scenes.iter().enumerate() {
                if let Some(fi) = scene.frames.iter().position(|f| f.id == id) {
                    return Ok((pi, si, fi));
                }
            }
        }
        Err(EditorError::not_found(EntityKind::Frame, id))
    }

    fn frame_at_slot(&mut self, (pi, si, fi): FrameSlot) -> &mut Frame {
        &mut self.projects[pi].scenes[si].frames[fi]
    }

    /// Record a mutation of a scene's contents.
    fn commit_scene(&mut self, pi: usize, si: usize) {
        self.projects[pi].scenes[si].touch();
        self.commit_project(pi);
    }

    fn commit_project(&mut self, pi: usize) {
        let project = &mut self.projects[pi];
        project.touch();
        self.dirty.insert(project.id);
        self.revision += 1;
    }

    // --- projects ---

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get_project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn create_project(&mut self, options: ProjectOptions) -> EditorResult<&Project> {
        let project = Project::new(options)?;
        info!("Created project {} ({})", project.name, project.id);
        self.dirty.insert(project.id);
        self.revision += 1;
        self.projects.push(project);
        Ok(&self.projects[self.projects.len() - 1])
    }

    /// Add or replace a project as-is, e.g. after loading it from storage.
    /// The project is not marked dirty.
    pub fn insert_project(&mut self, project: Project) -> ProjectId {
        let id = project.id;
        match self.projects.iter_mut().find(|p| p.id == id) {
            Some(existing) => *existing = project,
            None => self.projects.push(project),
        }
        self.revision += 1;
        id
    }

    pub fn update_project(&mut self, id: ProjectId, patch: ProjectPatch) -> EditorResult<()> {
        let pi = self.project_index(id)?;
        self.projects[pi].apply(patch)?;
        self.commit_project(pi);
        info!("Updated project {id}");
        Ok(())
    }

    pub fn delete_project(&mut self, id: ProjectId) -> EditorResult<Project> {
        let pi = self.project_index(id)?;
        let project = self.projects.remove(pi);
        if self.active_project == Some(id) {
            self.active_project = None;
        }
        self.recent.retain(|r| *r != id);
        self.dirty.remove(&id);
        self.revision += 1;
        info!("Deleted project {id}");
        Ok(project)
    }

    pub fn duplicate_project(&mut self, id: ProjectId) -> EditorResult<&Project> {
        let pi = self.project_index(id)?;
        let source = &self.projects[pi];
        let copy = source.deep_copy(format!("{} (Copy)", source.name));
        Ok(self.push_new(copy))
    }

    /// Serialize a project as pretty JSON.
    pub fn export_project(&self, id: ProjectId) -> EditorResult<String> {
        let project = self
            .get_project(id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Project, id))?;
        project
            .to_json()
            .map_err(|e| EditorError::ParseFailure(e.to_string()))
    }

    /// Import a project from JSON under fresh ids, named "<name> (Imported)".
    pub fn import_project(&mut self, json: &str) -> EditorResult<&Project> {
        let parsed =
            Project::from_json(json).map_err(|e| EditorError::ParseFailure(e.to_string()))?;
        if parsed.dimensions.width == 0 || parsed.dimensions.height == 0 {
            return Err(EditorError::InvalidArgument(
                "imported project has empty dimensions".to_string(),
            ));
        }
        let copy = parsed.deep_copy(format!("{} (Imported)", parsed.name));
        Ok(self.push_new(copy))
    }

    fn push_new(&mut self, project: Project) -> &Project {
        info!("Added project {} ({})", project.name, project.id);
        self.dirty.insert(project.id);
        self.revision += 1;
        self.projects.push(project);
        &self.projects[self.projects.len() - 1]
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.active_project.and_then(|id| self.get_project(id))
    }

    pub fn set_active_project(&mut self, id: ProjectId) -> EditorResult<()> {
        self.project_index(id)?;
        self.active_project = Some(id);
        self.recent.retain(|r| *r != id);
        self.recent.insert(0, id);
        self.recent.truncate(MAX_RECENT_PROJECTS);
        Ok(())
    }

    pub fn clear_active_project(&mut self) {
        self.active_project = None;
    }

    /// Most recently activated first.
    pub fn recent_projects(&self, limit: usize) -> Vec<&Project> {
        self.recent
            .iter()
            .filter_map(|id| self.get_project(*id))
            .take(limit)
            .collect()
    }

    // --- scenes ---

    pub fn get_scene(&self, id: SceneId) -> Option<&Scene> {
        let (pi, si) = self.scene_slot(id).ok()?;
        Some(&self.projects[pi].scenes[si])
    }

    pub fn scenes(&self, project_id: ProjectId) -> EditorResult<&[Scene]> {
        let pi = self.project_index(project_id)?;
        Ok(&self.projects[pi].scenes)
    }

    /// Append a scene (or insert at an explicit order). The scene starts
    /// without frames.
    pub fn create_scene(
        &mut self,
        project_id: ProjectId,
        options: SceneOptions,
    ) -> EditorResult<&Scene> {
        let pi = self.project_index(project_id)?;
        let project = &mut self.projects[pi];
        let order = options
            .order
            .unwrap_or(project.scenes.len())
            .min(project.scenes.len());
        for scene in project.scenes.iter_mut().filter(|s| s.order >= order) {
            scene.order += 1;
        }
        let scene = Scene::new(project_id, order, options);
        let id = scene.id;
        info!("Created scene {} ({id}) at {order}", scene.name);
        project.scenes.push(scene);
        project.normalize_scene_order();
        self.commit_project(pi);
        self.scene_ref(id)
    }

    fn scene_ref(&self, id: SceneId) -> EditorResult<&Scene> {
        self.get_scene(id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Scene, id))
    }

    pub fn update_scene(&mut self, id: SceneId, patch: ScenePatch) -> EditorResult<()> {
        let (pi, si) = self.scene_slot(id)?;
        self.projects[pi].scenes[si].apply(patch);
        self.commit_project(pi);
        Ok(())
    }

    /// Remove a scene and renumber the rest.
    pub fn delete_scene(&mut self, id: SceneId) -> EditorResult<Scene> {
        let (pi, si) = self.scene_slot(id)?;
        let project = &mut self.projects[pi];
        let scene = project.scenes.remove(si);
        project.normalize_scene_order();
        self.commit_project(pi);
        info!("Deleted scene {id}");
        Ok(scene)
    }

    /// Deep copy inserted right after the source.
    pub fn duplicate_scene(&mut self, id: SceneId) -> EditorResult<&Scene> {
        let (pi, si) = self.scene_slot(id)?;
        let project = &mut self.projects[pi];
        let source = &project.scenes[si];
        let order = source.order + 1;
        let copy = source.duplicate(order);
        let copy_id = copy.id;
        for scene in project.scenes.iter_mut().filter(|s| s.order >= order) {
            scene.order += 1;
        }
        project.scenes.push(copy);
        project.normalize_scene_order();
        self.commit_project(pi);
        info!("Duplicated scene {id} as {copy_id}");
        self.scene_ref(copy_id)
    }

    /// Listed scenes first in the given order, then any unlisted scenes in
    /// their previous order. Unknown ids are ignored.
    pub fn reorder_scenes(&mut self, project_id: ProjectId, ids: &[SceneId]) -> EditorResult<()> {
        let pi = self.project_index(project_id)?;
        let project = &mut self.projects[pi];
        let mut remaining = std::mem::take(&mut project.scenes);
        remaining.sort_by_key(|s| s.order);
        let mut ordered = Vec::with_capacity(remaining.len());
        for id in ids {
            if let Some(pos) = remaining.iter().position(|s| s.id == *id) {
                ordered.push(remaining.remove(pos));
            } else {
                debug!("Ignoring unknown scene {id} in reorder");
            }
        }
        ordered.append(&mut remaining);
        for (index, scene) in ordered.iter_mut().enumerate() {
            scene.order = index;
        }
        project.scenes = ordered;
        self.commit_project(pi);
        Ok(())
    }

    // --- frames ---

    pub fn get_frame(&self, id: FrameId) -> Option<&Frame> {
        let (pi, si, fi) = self.frame_slot(id).ok()?;
        Some(&self.projects[pi].scenes[si].frames[fi])
    }

    fn frame_ref(&self, id: FrameId) -> EditorResult<&Frame> {
        self.get_frame(id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Frame, id))
    }

    /// Frames of a scene in order.
    pub fn frames(&self, scene_id: SceneId) -> EditorResult<&[Frame]> {
        let (pi, si) = self.scene_slot(scene_id)?;
        Ok(&self.projects[pi].scenes[si].frames)
    }

    /// Zero when the scene does not exist.
    pub fn frame_count(&self, scene_id: SceneId) -> usize {
        self.frames(scene_id).map_or(0, <[Frame]>::len)
    }

    pub fn frame_at(&self, scene_id: SceneId, index: usize) -> Option<&Frame> {
        self.frames(scene_id).ok()?.get(index)
    }

    /// Append a frame, or insert it at `options.order` shifting later frames.
    pub fn create_frame(&mut self, scene_id: SceneId, options: FrameOptions) -> EditorResult<&Frame> {
        let (pi, si) = self.scene_slot(scene_id)?;
        let scene = &mut self.projects[pi].scenes[si];
        let order = options
            .order
            .unwrap_or(scene.frames.len())
            .min(scene.frames.len());
        for frame in scene.frames.iter_mut().filter(|f| f.order >= order) {
            frame.order += 1;
        }
        let frame = Frame::from_options(scene_id, order, options);
        let id = frame.id;
        scene.frames.push(frame);
        scene.normalize_frame_order();
        self.commit_scene(pi, si);
        info!("Created frame {id} at {order} in scene {scene_id}");
        self.frame_ref(id)
    }

    pub fn insert_frame(&mut self, scene_id: SceneId, position: usize) -> EditorResult<&Frame> {
        self.create_frame(
            scene_id,
            FrameOptions {
                order: Some(position),
                ..FrameOptions::default()
            },
        )
    }

    pub fn update_frame(&mut self, id: FrameId, patch: FramePatch) -> EditorResult<()> {
        let slot = self.frame_slot(id)?;
        self.frame_at_slot(slot).apply(patch);
        self.commit_scene(slot.0, slot.1);
        debug!("Updated frame {id}");
        Ok(())
    }

    /// Fails with InvalidOperation when it is the scene's last frame.
    pub fn delete_frame(&mut self, id: FrameId) -> EditorResult<Frame> {
        let (pi, si, fi) = self.frame_slot(id)?;
        let scene = &mut self.projects[pi].scenes[si];
        if scene.frames.len() <= 1 {
            warn!("Refusing to delete the last frame of scene {}", scene.id);
            return Err(EditorError::InvalidOperation(
                "cannot delete the last frame in a scene".to_string(),
            ));
        }
        let frame = scene.frames.remove(fi);
        scene.normalize_frame_order();
        self.commit_scene(pi, si);
        info!("Deleted frame {id}");
        Ok(frame)
    }

    /// Delete several frames of one scene at once. At least one frame must remain.
    pub fn delete_frames(&mut self, scene_id: SceneId, ids: &[FrameId]) -> EditorResult<usize> {
        let (pi, si) = self.scene_slot(scene_id)?;
        let scene = &mut self.projects[pi].scenes[si];
        let targets: HashSet<FrameId> = ids.iter().copied().collect();
        if let Some(missing) = targets
            .iter()
            .find(|id| !scene.frames.iter().any(|f| f.id == **id))
        {
            return Err(EditorError::not_found(EntityKind::Frame, missing));
        }
        if scene.frames.len() <= targets.len() {
            warn!("Refusing to delete every frame of scene {scene_id}");
            return Err(EditorError::InvalidOperation(
                "at least one frame must remain in a scene".to_string(),
            ));
        }
        scene.frames.retain(|f| !targets.contains(&f.id));
        scene.normalize_frame_order();
        self.commit_scene(pi, si);
        info!("Deleted {} frames from scene {scene_id}", targets.len());
        Ok(targets.len())
    }

    /// Deep copy with fresh ids, inserted right after the source.
    pub fn duplicate_frame(&mut self, id: FrameId) -> EditorResult<&Frame> {
        let (pi, si, fi) = self.frame_slot(id)?;
        let scene = &mut self.projects[pi].scenes[si];
        let order = scene.frames[fi].order + 1;
        let copy = scene.frames[fi].duplicate(scene.id, order);
        let copy_id = copy.id;
        for frame in scene.frames.iter_mut().filter(|f| f.order >= order) {
            frame.order += 1;
        }
        scene.frames.push(copy);
        scene.normalize_frame_order();
        self.commit_scene(pi, si);
        info!("Duplicated frame {id} as {copy_id}");
        self.frame_ref(copy_id)
    }

    /// Assign `order = position` from `ids`, which must name every frame of
    /// the scene exactly once.
    pub fn reorder_frames(&mut self, scene_id: SceneId, ids: &[FrameId]) -> EditorResult<()> {
        let (pi, si) = self.scene_slot(scene_id)?;
        let scene = &mut self.projects[pi].scenes[si];
        let existing: HashSet<FrameId> = scene.frames.iter().map(|f| f.id).collect();
        let requested: HashSet<FrameId> = ids.iter().copied().collect();
        if ids.len() != scene.frames.len() || requested != existing {
            warn!("Rejected frame reorder for scene {scene_id}: id set mismatch");
            return Err(EditorError::InvalidArgument(
                "frame ids do not match the scene's frames".to_string(),
            ));
        }
        for frame in scene.frames.iter_mut() {
            if let Some(position) = ids.iter().position(|id| *id == frame.id) {
                frame.order = position;
                frame.touch();
            }
        }
        scene.frames.sort_by_key(|f| f.order);
        self.commit_scene(pi, si);
        info!("Reordered frames of scene {scene_id}");
        Ok(())
    }

    // --- elements ---

    /// Append an element on top of the frame's paint order.
    pub fn add_element(&mut self, frame_id: FrameId, element: Element) -> EditorResult<ElementId> {
        let slot = self.frame_slot(frame_id)?;
        let frame = self.frame_at_slot(slot);
        let id = element.id;
        if frame.element(id).is_some() {
            return Err(EditorError::InvalidOperation(format!(
                "element {id} already exists in frame {frame_id}"
            )));
        }
        frame.elements.push(element);
        frame.touch();
        self.commit_scene(slot.0, slot.1);
        debug!("Added element {id} to frame {frame_id}");
        Ok(id)
    }

    pub fn update_element(
        &mut self,
        frame_id: FrameId,
        element_id: ElementId,
        f: impl FnOnce(&mut Element),
    ) -> EditorResult<()> {
        let slot = self.frame_slot(frame_id)?;
        let frame = self.frame_at_slot(slot);
        let element = frame
            .element_mut(element_id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Element, element_id))?;
        f(element);
        element.touch();
        frame.touch();
        self.commit_scene(slot.0, slot.1);
        Ok(())
    }

    pub fn remove_element(&mut self, frame_id: FrameId, element_id: ElementId) -> EditorResult<Element> {
        let slot = self.frame_slot(frame_id)?;
        let frame = self.frame_at_slot(slot);
        let index = frame
            .elements
            .iter()
            .position(|e| e.id == element_id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Element, element_id))?;
        let element = frame.elements.remove(index);
        frame.touch();
        self.commit_scene(slot.0, slot.1);
        debug!("Removed element {element_id} from frame {frame_id}");
        Ok(element)
    }

    /// Remove every listed element that exists. Returns how many were removed.
    pub fn remove_elements(&mut self, frame_id: FrameId, ids: &[ElementId]) -> EditorResult<usize> {
        let slot = self.frame_slot(frame_id)?;
        let frame = self.frame_at_slot(slot);
        let before = frame.elements.len();
        frame.elements.retain(|e| !ids.contains(&e.id));
        let removed = before - frame.elements.len();
        if removed > 0 {
            frame.touch();
            self.commit_scene(slot.0, slot.1);
        }
        Ok(removed)
    }

    /// Swap in new versions of existing elements, matched by id, as one commit.
    /// Nothing changes if any id is missing.
    pub fn replace_elements(&mut self, frame_id: FrameId, elements: Vec<Element>) -> EditorResult<()> {
        let slot = self.frame_slot(frame_id)?;
        let frame = self.frame_at_slot(slot);
        if let Some(missing) = elements.iter().find(|e| frame.element(e.id).is_none()) {
            return Err(EditorError::not_found(EntityKind::Element, missing.id));
        }
        let count = elements.len();
        for mut replacement in elements {
            replacement.touch();
            if let Some(target) = frame.element_mut(replacement.id) {
                *target = replacement;
            }
        }
        frame.touch();
        self.commit_scene(slot.0, slot.1);
        debug!("Replaced {count} elements in frame {frame_id}");
        Ok(())
    }

    /// Copy an element into another frame and delete the original.
    pub fn move_element_to_frame(
        &mut self,
        from: FrameId,
        element_id: ElementId,
        to: FrameId,
    ) -> EditorResult<()> {
        if from == to {
            return Ok(());
        }
        self.frame_slot(to)?;
        let element = self
            .frame_ref(from)?
            .element(element_id)
            .cloned()
            .ok_or_else(|| EditorError::not_found(EntityKind::Element, element_id))?;
        self.add_element(to, element)?;
        self.remove_element(from, element_id)?;
        info!("Moved element {element_id} from frame {from} to {to}");
        Ok(())
    }
}
