//! Typed identifier definitions for all agent-visible resources.
//!
//! Each identifier is a UUID assigned by the control plane (or, for devices,
//! by the operator inventory). The types exist purely to keep the resource
//! hierarchy from being mixed up at compile time.

use crate::define_id;

// =============================================================================
// Ownership
// =============================================================================

define_id!(ProjectId);
define_id!(AgentId);

// =============================================================================
// Loadbalancer hierarchy
// =============================================================================

define_id!(LoadBalancerId);
define_id!(ListenerId);
define_id!(PoolId);
define_id!(MemberId);

// =============================================================================
// Appliances
// =============================================================================

define_id!(DeviceId);
